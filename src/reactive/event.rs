//! StoreEvent — notifications emitted by the domain stores.
//!
//! The presentation layer subscribes to these instead of polling getters.
//! Events are coarse on purpose: they say *what changed where*, and the
//! subscriber re-reads store state for the details.

use crate::store::state::LoadPhase;

/// A change notification from one domain store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A fetch began for `resource`.
    FetchStarted {
        domain: &'static str,
        resource: String,
    },
    /// A fetch settled; `phase` is where the state machine landed.
    FetchSettled {
        domain: &'static str,
        resource: String,
        phase: LoadPhase,
    },
    /// An optimistic mutation was applied or confirmed for one record.
    RecordMutated {
        domain: &'static str,
        resource: String,
        id: String,
    },
    /// A failed mutation was rolled back; local state matches the last
    /// confirmed state again.
    MutationRolledBack {
        domain: &'static str,
        resource: String,
        id: String,
    },
    /// The error flag was dismissed.
    ErrorCleared {
        domain: &'static str,
        resource: String,
    },
}

impl StoreEvent {
    /// The domain that emitted the event.
    pub fn domain(&self) -> &'static str {
        match self {
            Self::FetchStarted { domain, .. }
            | Self::FetchSettled { domain, .. }
            | Self::RecordMutated { domain, .. }
            | Self::MutationRolledBack { domain, .. }
            | Self::ErrorCleared { domain, .. } => domain,
        }
    }

    /// The resource the event concerns.
    pub fn resource(&self) -> &str {
        match self {
            Self::FetchStarted { resource, .. }
            | Self::FetchSettled { resource, .. }
            | Self::RecordMutated { resource, .. }
            | Self::MutationRolledBack { resource, .. }
            | Self::ErrorCleared { resource, .. } => resource,
        }
    }
}
