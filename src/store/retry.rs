//! Pending operation — the retry handle's recorded attempt, stored as data.
//!
//! A tagged variant rather than a captured closure: it can be inspected,
//! logged, and replayed deterministically. The slot holds the most recent
//! attempt while it is unconfirmed and is cleared on success, so what
//! remains after a failure is exactly the operation a user-triggered retry
//! should re-execute verbatim.

use parking_lot::Mutex;

/// The last attempted fetch-or-mutate operation for one store.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingOp<I, P> {
    Fetch {
        resource: String,
        /// Raw file content supplied with the original fetch (chunk domain);
        /// replayed so a retried fetch can still synthesize a fallback.
        source: Option<String>,
    },
    Create {
        resource: String,
        input: I,
    },
    Update {
        resource: String,
        id: String,
        patch: P,
    },
    Delete {
        resource: String,
        id: String,
    },
}

impl<I, P> PendingOp<I, P> {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    /// The resource the operation targets.
    pub fn resource(&self) -> &str {
        match self {
            Self::Fetch { resource, .. }
            | Self::Create { resource, .. }
            | Self::Update { resource, .. }
            | Self::Delete { resource, .. } => resource,
        }
    }
}

/// Single-slot recorder for the most recent operation. Overwritten on each
/// new attempt; invoking retry leaves the recording in place (the replayed
/// attempt re-records itself).
pub struct RetryHandle<I, P> {
    slot: Mutex<Option<PendingOp<I, P>>>,
}

impl<I: Clone, P: Clone> RetryHandle<I, P> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Record `op` as the most recent attempt, overwriting any previous one.
    pub fn record(&self, op: PendingOp<I, P>) {
        *self.slot.lock() = Some(op);
    }

    /// The recorded operation, if any.
    pub fn current(&self) -> Option<PendingOp<I, P>> {
        self.slot.lock().clone()
    }

    /// Drop the recording (called when the recorded attempt confirms).
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}

impl<I: Clone, P: Clone> Default for RetryHandle<I, P> {
    fn default() -> Self {
        Self::new()
    }
}
