//! Error types for the core crate.

use thiserror::Error;

/// Errors reported by [`crate::PollingThread`] lifecycle transitions.
#[derive(Error, Debug)]
pub enum PollingError {
    /// `start` was called while the loop is already running.
    #[error("polling thread is already running")]
    AlreadyRunning,

    /// The operating system refused to spawn the loop thread.
    #[error("failed to spawn polling thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// `stop` was called from inside the worker; the loop will exit after the
    /// current invocation but cannot be joined from its own thread.
    #[error("polling thread cannot be joined from its own worker")]
    StopFromWorker,

    /// The loop thread terminated abnormally.
    #[error("polling thread could not be joined")]
    JoinFailed,
}

/// A failure raised by a worker callback during one polling iteration.
///
/// Faults never change the running state of the loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerFault {
    /// The worker returned an error.
    #[error("worker failed: {0}")]
    Failed(String),

    /// The worker panicked.
    #[error("worker panicked: {0}")]
    Panicked(String),
}

/// Result type for polling thread operations.
pub type PollingResult<T> = Result<T, PollingError>;
