//! DocumentCache — keyed last-known-good payloads, one entry per resource.
//!
//! Consulted before any network call; a present entry short-circuits the
//! fetch. Entries are refreshed on every successful fetch and never expire
//! on their own (no TTL) — they live until `invalidate`/`clear` or process
//! teardown. Unbounded growth is an accepted limitation.

use std::collections::HashMap;

use parking_lot::Mutex;

/// In-memory map from resource identifier to the last-known-good payload.
///
/// All methods take `&self`; internal state is behind a `parking_lot::Mutex`
/// that is never held while caller code runs. Reads clone the payload so
/// multiple consumers can hold results without coordination.
pub struct DocumentCache<P> {
    entries: Mutex<HashMap<String, P>>,
}

impl<P: Clone> DocumentCache<P> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Last-known-good payload for `resource`, if any.
    pub fn get(&self, resource: &str) -> Option<P> {
        self.entries.lock().get(resource).cloned()
    }

    /// Store `payload` as the last-known-good value for `resource`,
    /// replacing any previous entry.
    pub fn set(&self, resource: &str, payload: P) {
        self.entries.lock().insert(resource.to_string(), payload);
    }

    /// Whether an entry exists for `resource`.
    pub fn contains(&self, resource: &str) -> bool {
        self.entries.lock().contains_key(resource)
    }

    /// Drop the entry for `resource`, forcing the next fetch to hit the
    /// network.
    pub fn invalidate(&self, resource: &str) {
        self.entries.lock().remove(resource);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of cached resources.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<P: Clone> Default for DocumentCache<P> {
    fn default() -> Self {
        Self::new()
    }
}
