//! Core systems for featurescope.
//!
//! This crate provides the pieces of featurescope that do not depend on the
//! camera feature model:
//!
//! - **Signals**: type-safe observer notifications used by item models and
//!   background threads
//! - **Polling thread**: a background loop that runs a worker callback at a
//!   fixed cadence with mutex-guarded start/stop
//! - **Logging**: `tracing` targets, convenience macros and perf spans
//!
//! # Polling Example
//!
//! ```no_run
//! use featurescope_core::{PollingThread, WorkerFault};
//!
//! let thread = PollingThread::builder()
//!     .name("acquisition")
//!     .worker(|| {
//!         // fetch one buffer from the device
//!         Ok(())
//!     })
//!     .build();
//!
//! thread.on_fault().connect(|fault: &WorkerFault| {
//!     eprintln!("acquisition fault: {fault}");
//! });
//!
//! thread.start()?;
//! // ...
//! thread.stop()?;
//! # Ok::<(), featurescope_core::PollingError>(())
//! ```

pub mod error;
pub mod logging;
pub mod polling;
pub mod signal;

pub use error::{PollingError, PollingResult, WorkerFault};
pub use logging::PerfSpan;
pub use polling::{
    MIN_CADENCE, PollingConfig, PollingGuard, PollingThread, PollingThreadBuilder, WorkerError,
    WorkerResult,
};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
