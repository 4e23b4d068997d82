//! EventEmitter<T> — typed synchronous pub/sub.
//!
//! Snapshot-on-emit: a listener removed during emission is still called in
//! that round, one added during emission is not called until the next. The
//! internal lock is never held while a listener runs, so listeners may
//! subscribe/unsubscribe reentrantly without deadlocking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Handle returned by [`EventEmitter::subscribe`]; pass to
/// [`EventEmitter::unsubscribe`] to remove the listener.
pub type SubscriptionId = u64;

type ListenerFn<T> = dyn Fn(&T) + Send + Sync;

/// Typed synchronous event emitter.
pub struct EventEmitter<T> {
    listeners: Mutex<HashMap<SubscriptionId, Arc<ListenerFn<T>>>>,
    next_id: AtomicU64,
}

impl<T> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `listener` and return its [`SubscriptionId`].
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().insert(id, Arc::new(listener));
        id
    }

    /// Remove the listener for `id`. Safe to call more than once.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().remove(&id);
    }

    /// Emit `event` to every listener registered at the time of the call.
    pub fn emit(&self, event: &T) {
        let snapshot: Vec<Arc<ListenerFn<T>>> = {
            let guard = self.listeners.lock();
            let mut entries: Vec<(SubscriptionId, Arc<ListenerFn<T>>)> = guard
                .iter()
                .map(|(id, cb)| (*id, Arc::clone(cb)))
                .collect();
            // Stable notification order regardless of map iteration order.
            entries.sort_by_key(|(id, _)| *id);
            entries.into_iter().map(|(_, cb)| cb).collect()
        };
        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}
