//! Observer notifications for featurescope.
//!
//! A [`Signal`] carries change notifications from a producer (an item model,
//! a polling thread) to any number of connected slots. Slots are plain
//! closures invoked synchronously on the emitting thread, in connection
//! order.
//!
//! Item models emit from the UI thread; [`crate::PollingThread`] emits worker
//! faults from its background thread, so slots must be `Send + Sync`.
//!
//! # Example
//!
//! ```
//! use featurescope_core::Signal;
//!
//! let value_changed = Signal::<String>::new();
//!
//! let id = value_changed.connect(|text| {
//!     println!("value changed to {text}");
//! });
//!
//! value_changed.emit("ExposureTime".to_string());
//! value_changed.disconnect(id);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifier of one signal/slot connection.
    ///
    /// Returned by [`Signal::connect`] and accepted by [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal with any number of connected slots.
///
/// `Args` is the payload handed to every slot. Use `()` for bare
/// notifications and tuples for several values.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Create a signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot. The returned id disconnects it again.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnect a slot by id.
    ///
    /// Returns `true` if the connection existed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect every slot.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Suppress (or re-enable) emission.
    ///
    /// Useful while a model is rebuilt in bulk.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Whether emission is currently suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Invoke every connected slot with `args`.
    ///
    /// The connection table is snapshotted first, so slots may connect or
    /// disconnect (including themselves) without deadlocking.
    #[tracing::instrument(skip_all, target = "featurescope_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }

    /// Connect a slot that is disconnected when the returned guard drops.
    ///
    /// The guard keeps only a weak reference, so it never extends the
    /// lifetime of the signal.
    pub fn connect_scoped<F>(self: &Arc<Self>, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            signal: Arc::downgrade(self),
            id,
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::Relaxed))
            .finish()
    }
}

/// RAII connection created by [`Signal::connect_scoped`].
pub struct ConnectionGuard<Args: Clone + Send + 'static> {
    signal: Weak<Signal<Args>>,
    id: ConnectionId,
}

impl<Args: Clone + Send + 'static> ConnectionGuard<Args> {
    /// The id of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: Clone + Send + 'static> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.upgrade() {
            signal.disconnect(self.id);
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
