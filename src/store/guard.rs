//! ConfirmGuard — per-key monotonic epochs for discarding stale completions.
//!
//! Every fetch or mutation attempt begins an epoch for its key; the async
//! completion carries the epoch back and is applied only if no later attempt
//! has begun for the same key. Keys are `"fetch:{resource}"` for fetches and
//! `"record:{id}"` for mutations, so fetches guard per resource and
//! mutations per record.

use std::collections::HashMap;

use parking_lot::Mutex;

/// An epoch token returned by [`ConfirmGuard::begin`].
pub type Epoch = u64;

/// Keyed monotonic epoch counter.
pub struct ConfirmGuard {
    epochs: Mutex<HashMap<String, Epoch>>,
}

impl ConfirmGuard {
    pub fn new() -> Self {
        Self {
            epochs: Mutex::new(HashMap::new()),
        }
    }

    /// Start a new attempt for `key`; the returned epoch supersedes all
    /// earlier ones.
    pub fn begin(&self, key: &str) -> Epoch {
        let mut epochs = self.epochs.lock();
        let epoch = epochs.entry(key.to_string()).or_insert(0);
        *epoch += 1;
        *epoch
    }

    /// Whether `epoch` is still the latest attempt for `key`.
    pub fn is_current(&self, key: &str, epoch: Epoch) -> bool {
        self.epochs.lock().get(key) == Some(&epoch)
    }

    /// Forget all epochs (reset / resource teardown). In-flight completions
    /// holding old epochs will be treated as stale.
    pub fn clear(&self) {
        self.epochs.lock().clear();
    }
}

impl Default for ConfirmGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard key for fetches of `resource`.
pub fn fetch_key(resource: &str) -> String {
    format!("fetch:{resource}")
}

/// Guard key for mutations of record `id`.
pub fn record_key(id: &str) -> String {
    format!("record:{id}")
}
