//! Cooperative polling thread for background camera I/O.
//!
//! A [`PollingThread`] owns one dedicated thread that invokes a worker
//! callback repeatedly, sleeping a fixed cadence between invocations, until
//! it is stopped. It is the primitive the acquisition layer uses to fetch
//! buffers from a device without blocking the interactive surface.
//!
//! # Lifecycle
//!
//! ```text
//!   Idle ──start()──> Running ──stop()──> StopRequested ──loop exits──> Idle
//! ```
//!
//! A single mutex guards the running flag. The loop reads the flag under it
//! before every invocation, [`PollingThread::stop`] clears it under it and
//! then joins the thread, and [`PollingThread::acquire`] hands the same lock
//! to callers that need to coordinate with the loop. Once `stop()` returns
//! the worker is never invoked again.
//!
//! Cancellation is cooperative: the current invocation always runs to
//! completion, so a worker must bound its own execution time.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! use featurescope_core::PollingThread;
//!
//! let frames = Arc::new(AtomicUsize::new(0));
//! let counter = frames.clone();
//!
//! let thread = PollingThread::builder()
//!     .name("acquisition")
//!     .cadence(Duration::from_millis(1))
//!     .worker(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     })
//!     .build();
//!
//! thread.start()?;
//! std::thread::sleep(Duration::from_millis(50));
//! thread.stop()?;
//! # Ok::<(), featurescope_core::PollingError>(())
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::error::{PollingError, PollingResult, WorkerFault};
use crate::logging::targets;
use crate::signal::Signal;

/// Shortest cadence the loop accepts.
pub const MIN_CADENCE: Duration = Duration::from_micros(1);

/// Error type a worker may return from one invocation.
pub type WorkerError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of one worker invocation.
pub type WorkerResult = Result<(), WorkerError>;

type WorkerFn = Arc<dyn Fn() -> WorkerResult + Send + Sync>;

/// Configuration for a [`PollingThread`].
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Name given to the loop thread.
    pub name: String,
    /// Pause between two worker invocations. Clamped to [`MIN_CADENCE`].
    pub cadence: Duration,
    /// Stack size of the loop thread in bytes. `None` uses the default.
    pub stack_size: Option<usize>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            name: "featurescope-polling".to_string(),
            cadence: MIN_CADENCE,
            stack_size: None,
        }
    }
}

impl PollingConfig {
    /// Create a configuration with the given thread name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the cadence in microseconds.
    pub fn cadence_us(mut self, micros: u64) -> Self {
        self.cadence = Duration::from_micros(micros);
        self
    }

    fn effective_cadence(&self) -> Duration {
        self.cadence.max(MIN_CADENCE)
    }
}

/// Builder for [`PollingThread`].
#[derive(Default)]
pub struct PollingThreadBuilder {
    config: PollingConfig,
    worker: Option<WorkerFn>,
}

impl PollingThreadBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the thread name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the cadence between invocations.
    pub fn cadence(mut self, cadence: Duration) -> Self {
        self.config.cadence = cadence;
        self
    }

    /// Set the stack size of the loop thread.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    /// Install the initial worker.
    pub fn worker<F>(mut self, worker: F) -> Self
    where
        F: Fn() -> WorkerResult + Send + Sync + 'static,
    {
        self.worker = Some(Arc::new(worker));
        self
    }

    /// Build an idle polling thread.
    pub fn build(self) -> PollingThread {
        let thread = PollingThread::with_config(self.config);
        *thread.shared.worker.write() = self.worker;
        thread
    }
}

/// State protected by the single polling mutex.
#[derive(Debug, Default)]
struct PollingState {
    running: bool,
    loop_thread: Option<ThreadId>,
}

/// State shared between the handle and the loop thread.
struct Shared {
    state: Mutex<PollingState>,
    worker: RwLock<Option<WorkerFn>>,
    fault_signal: Signal<WorkerFault>,
    faults: AtomicU64,
    iterations: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(PollingState::default()),
            worker: RwLock::new(None),
            fault_signal: Signal::new(),
            faults: AtomicU64::new(0),
            iterations: AtomicU64::new(0),
        }
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }

    fn invoke(&self, worker: &WorkerFn) {
        self.iterations.fetch_add(1, Ordering::Relaxed);

        let fault = match panic::catch_unwind(AssertUnwindSafe(|| worker())) {
            Ok(Ok(())) => return,
            Ok(Err(err)) => WorkerFault::Failed(err.to_string()),
            Err(payload) => WorkerFault::Panicked(panic_message(payload.as_ref())),
        };

        self.faults.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(target: targets::POLLING, %fault, "worker fault, polling continues");
        self.fault_signal.emit(fault);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A background thread that runs a worker at a fixed cadence.
///
/// The worker can be replaced at any time with [`set_worker`]; the loop
/// picks up the new one at its next iteration. Worker errors and panics are
/// reported as [`WorkerFault`]s on [`on_fault`] and through `tracing`, and
/// never stop the loop.
///
/// Stop the thread before dropping it. Dropping a running thread logs a
/// warning and stops it.
///
/// [`set_worker`]: PollingThread::set_worker
/// [`on_fault`]: PollingThread::on_fault
pub struct PollingThread {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
    config: PollingConfig,
}

impl PollingThread {
    /// Create an idle polling thread with default configuration.
    pub fn new() -> Self {
        Self::with_config(PollingConfig::default())
    }

    /// Create an idle polling thread with custom configuration.
    pub fn with_config(config: PollingConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new()),
            handle: Mutex::new(None),
            config,
        }
    }

    /// Start building a polling thread.
    pub fn builder() -> PollingThreadBuilder {
        PollingThreadBuilder::new()
    }

    /// The configuration this thread was created with.
    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    /// The pause between two invocations.
    pub fn cadence(&self) -> Duration {
        self.config.effective_cadence()
    }

    /// Replace the worker. Takes effect at the next iteration.
    pub fn set_worker<F>(&self, worker: F)
    where
        F: Fn() -> WorkerResult + Send + Sync + 'static,
    {
        *self.shared.worker.write() = Some(Arc::new(worker));
    }

    /// Remove the worker. The loop keeps its cadence but invokes nothing.
    pub fn clear_worker(&self) {
        *self.shared.worker.write() = None;
    }

    /// Whether a worker is installed.
    pub fn has_worker(&self) -> bool {
        self.shared.worker.read().is_some()
    }

    /// Whether the loop is running (read under the polling mutex).
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Id of the loop thread while it runs.
    pub fn thread_id(&self) -> Option<ThreadId> {
        self.shared.state.lock().loop_thread
    }

    /// Signal emitted on the loop thread for every worker fault.
    pub fn on_fault(&self) -> &Signal<WorkerFault> {
        &self.shared.fault_signal
    }

    /// Number of faults reported since creation.
    pub fn fault_count(&self) -> u64 {
        self.shared.faults.load(Ordering::Relaxed)
    }

    /// Number of worker invocations since creation.
    pub fn iteration_count(&self) -> u64 {
        self.shared.iterations.load(Ordering::Relaxed)
    }

    /// Start the loop.
    ///
    /// Returns [`PollingError::AlreadyRunning`] if the loop is running; a
    /// second loop is never spawned against the same state.
    pub fn start(&self) -> PollingResult<()> {
        let mut handle = self.handle.lock();

        if self.shared.is_running() {
            tracing::warn!(target: targets::POLLING, name = %self.config.name, "start ignored, already running");
            return Err(PollingError::AlreadyRunning);
        }

        // A loop stopped from inside its own worker is still winding down.
        if let Some(previous) = handle.take() {
            if previous.join().is_err() {
                tracing::warn!(target: targets::POLLING, "previous polling loop terminated abnormally");
            }
        }

        self.shared.state.lock().running = true;

        let mut builder = thread::Builder::new().name(self.config.name.clone());
        if let Some(stack_size) = self.config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let shared = self.shared.clone();
        let cadence = self.config.effective_cadence();
        match builder.spawn(move || polling_loop(shared, cadence)) {
            Ok(spawned) => {
                tracing::debug!(target: targets::POLLING, name = %self.config.name, ?cadence, "polling thread started");
                *handle = Some(spawned);
                Ok(())
            }
            Err(err) => {
                self.shared.state.lock().running = false;
                Err(PollingError::Spawn(err))
            }
        }
    }

    /// Stop the loop and wait for its thread to exit.
    ///
    /// Safe to call on an idle thread. When called from inside the worker
    /// the flag is cleared and [`PollingError::StopFromWorker`] is returned
    /// without joining; the loop exits after the current invocation.
    ///
    /// The handle lock is taken before the flag is cleared, so a concurrent
    /// `start()` either completes first and its loop is the one stopped, or
    /// runs after this call returns.
    pub fn stop(&self) -> PollingResult<()> {
        {
            let mut state = self.shared.state.lock();
            if state.loop_thread == Some(thread::current().id()) {
                state.running = false;
                return Err(PollingError::StopFromWorker);
            }
        }

        let mut handle = self.handle.lock();
        self.shared.state.lock().running = false;
        match handle.take() {
            Some(running) => {
                let joined = running.join();
                tracing::debug!(target: targets::POLLING, name = %self.config.name, "polling thread stopped");
                joined.map_err(|_| PollingError::JoinFailed)
            }
            None => Ok(()),
        }
    }

    /// Lock the polling mutex.
    ///
    /// While the guard lives the loop cannot begin another iteration and
    /// `stop` cannot clear the flag. Calling `stop` or `start` on the same
    /// thread while holding the guard deadlocks.
    pub fn acquire(&self) -> PollingGuard<'_> {
        PollingGuard {
            state: self.shared.state.lock(),
            shared: &self.shared,
        }
    }

    /// Release a guard obtained from [`acquire`](Self::acquire).
    pub fn release(&self, guard: PollingGuard<'_>) {
        drop(guard);
    }
}

impl Default for PollingThread {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PollingThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingThread")
            .field("name", &self.config.name)
            .field("cadence", &self.cadence())
            .field("running", &self.is_running())
            .field("faults", &self.fault_count())
            .finish()
    }
}

impl Drop for PollingThread {
    fn drop(&mut self) {
        if self.is_running() {
            tracing::warn!(target: targets::POLLING, name = %self.config.name, "polling thread dropped while running");
            if let Err(err) = self.stop() {
                tracing::warn!(target: targets::POLLING, %err, "failed to stop polling thread on drop");
            }
        }
    }
}

/// Scoped hold on the polling mutex, returned by [`PollingThread::acquire`].
pub struct PollingGuard<'a> {
    state: MutexGuard<'a, PollingState>,
    shared: &'a Shared,
}

impl PollingGuard<'_> {
    /// The running flag as seen under the lock.
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Swap the worker while the loop is held between iterations.
    pub fn replace_worker<F>(&self, worker: F)
    where
        F: Fn() -> WorkerResult + Send + Sync + 'static,
    {
        *self.shared.worker.write() = Some(Arc::new(worker));
    }
}

fn polling_loop(shared: Arc<Shared>, cadence: Duration) {
    shared.state.lock().loop_thread = Some(thread::current().id());

    while shared.is_running() {
        let worker = shared.worker.read().clone();
        if let Some(worker) = worker {
            shared.invoke(&worker);
        }
        thread::sleep(cadence);
    }

    shared.state.lock().loop_thread = None;
    tracing::trace!(target: targets::POLLING, "polling loop exited");
}

static_assertions::assert_impl_all!(PollingThread: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_thread(counter: Arc<AtomicUsize>) -> PollingThread {
        PollingThread::builder()
            .name("test-polling")
            .cadence(Duration::from_micros(100))
            .worker(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build()
    }

    #[test]
    fn test_created_idle() {
        let thread = PollingThread::new();
        assert!(!thread.is_running());
        assert!(thread.thread_id().is_none());
        assert!(!thread.has_worker());
        assert_eq!(thread.cadence(), MIN_CADENCE);
    }

    #[test]
    fn test_zero_cadence_is_clamped() {
        let thread = PollingThread::builder().cadence(Duration::ZERO).build();
        assert_eq!(thread.cadence(), MIN_CADENCE);
    }

    #[test]
    fn test_start_stop_counts() {
        let counter = Arc::new(AtomicUsize::new(0));
        let thread = counting_thread(counter.clone());

        thread.start().unwrap();
        assert!(thread.is_running());
        std::thread::sleep(Duration::from_millis(50));
        thread.stop().unwrap();
        assert!(!thread.is_running());

        let after_stop = counter.load(Ordering::SeqCst);
        assert!(after_stop > 0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(counter.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_double_start_is_reported() {
        let counter = Arc::new(AtomicUsize::new(0));
        let thread = counting_thread(counter);

        thread.start().unwrap();
        assert!(matches!(thread.start(), Err(PollingError::AlreadyRunning)));
        assert!(thread.is_running());
        thread.stop().unwrap();
    }

    #[test]
    fn test_stop_when_idle() {
        let thread = PollingThread::new();
        assert!(thread.stop().is_ok());
        assert!(thread.stop().is_ok());
    }

    #[test]
    fn test_restart_after_stop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let thread = counting_thread(counter.clone());

        thread.start().unwrap();
        std::thread::sleep(Duration::from_millis(10));
        thread.stop().unwrap();
        let first = counter.load(Ordering::SeqCst);

        thread.start().unwrap();
        std::thread::sleep(Duration::from_millis(10));
        thread.stop().unwrap();
        assert!(counter.load(Ordering::SeqCst) > first);
    }

    #[test]
    fn test_worker_errors_do_not_stop_loop() {
        let thread = PollingThread::builder()
            .cadence(Duration::from_micros(100))
            .worker(|| Err("device timeout".into()))
            .build();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        thread.on_fault().connect(move |fault| {
            seen_clone.lock().push(fault.clone());
        });

        thread.start().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(thread.is_running());
        thread.stop().unwrap();

        assert!(thread.fault_count() > 0);
        assert_eq!(
            seen.lock().first(),
            Some(&WorkerFault::Failed("device timeout".to_string()))
        );
    }

    #[test]
    fn test_worker_panic_is_a_fault() {
        let thread = PollingThread::builder()
            .cadence(Duration::from_micros(100))
            .worker(|| panic!("buffer underrun"))
            .build();

        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        thread.on_fault().connect(move |fault| {
            *seen_clone.lock() = Some(fault.clone());
        });

        thread.start().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(thread.is_running());
        thread.stop().unwrap();

        assert_eq!(
            *seen.lock(),
            Some(WorkerFault::Panicked("buffer underrun".to_string()))
        );
    }

    #[test]
    fn test_acquire_blocks_iterations() {
        let counter = Arc::new(AtomicUsize::new(0));
        let thread = counting_thread(counter.clone());
        thread.start().unwrap();
        std::thread::sleep(Duration::from_millis(5));

        let guard = thread.acquire();
        assert!(guard.is_running());
        // At most the invocation already past its flag check can complete.
        std::thread::sleep(Duration::from_millis(5));
        let held = counter.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(counter.load(Ordering::SeqCst), held);
        thread.release(guard);

        std::thread::sleep(Duration::from_millis(10));
        assert!(counter.load(Ordering::SeqCst) > held);
        thread.stop().unwrap();
    }

    #[test]
    fn test_replace_worker_under_guard() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let thread = counting_thread(first.clone());
        thread.start().unwrap();
        std::thread::sleep(Duration::from_millis(5));

        {
            let guard = thread.acquire();
            let second_clone = second.clone();
            guard.replace_worker(move || {
                second_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        let first_after_swap = first.load(Ordering::SeqCst);

        std::thread::sleep(Duration::from_millis(10));
        thread.stop().unwrap();
        assert!(second.load(Ordering::SeqCst) > 0);
        assert!(first.load(Ordering::SeqCst) <= first_after_swap + 1);
    }

    #[test]
    fn test_stop_from_worker() {
        let thread = Arc::new(
            PollingThread::builder()
                .cadence(Duration::from_micros(100))
                .build(),
        );
        let outcome = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&thread);
        let outcome_clone = outcome.clone();
        thread.set_worker(move || {
            if let Some(thread) = weak.upgrade() {
                let result = thread.stop();
                *outcome_clone.lock() = Some(matches!(result, Err(PollingError::StopFromWorker)));
            }
            Ok(())
        });

        thread.start().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(!thread.is_running());
        assert_eq!(*outcome.lock(), Some(true));
        thread.stop().unwrap();
        assert!(thread.thread_id().is_none());
    }

    #[test]
    fn test_stop_waits_for_concurrent_restart() {
        let thread = Arc::new(
            PollingThread::builder()
                .cadence(Duration::from_micros(100))
                .build(),
        );
        let invocations = Arc::new(AtomicUsize::new(0));

        // The first invocation stops its own loop and lingers while winding down.
        let weak = Arc::downgrade(&thread);
        let counter = invocations.clone();
        thread.set_worker(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                if let Some(thread) = weak.upgrade() {
                    let _ = thread.stop();
                }
                std::thread::sleep(Duration::from_millis(200));
            }
            Ok(())
        });

        thread.start().unwrap();
        while thread.is_running() || invocations.load(Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }

        let starter = {
            let thread = thread.clone();
            std::thread::spawn(move || thread.start())
        };
        // Let the restart take the handle and begin joining the old loop.
        std::thread::sleep(Duration::from_millis(50));

        let (tx, rx) = std::sync::mpsc::channel();
        let stopper = {
            let thread = thread.clone();
            std::thread::spawn(move || {
                let _ = tx.send(thread.stop().is_ok());
            })
        };

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(true));
        stopper.join().unwrap();
        starter.join().unwrap().unwrap();
        assert!(!thread.is_running());
        assert!(thread.thread_id().is_none());
    }

    #[test]
    fn test_drop_while_running_stops() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let thread = counting_thread(counter.clone());
            thread.start().unwrap();
            std::thread::sleep(Duration::from_millis(5));
        }
        let after_drop = counter.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(counter.load(Ordering::SeqCst), after_drop);
    }
}
