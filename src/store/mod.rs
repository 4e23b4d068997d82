//! The synchronization core: one reusable store shape driven by the domain
//! configurations in [`crate::domains`].
//!
//! Control flow for every domain: UI event, optimistic local change,
//! confirming network call; on success reconcile with server truth, on
//! failure roll back and let the fallback policy decide the degraded view,
//! with the attempt recorded for user-triggered retry.

pub mod detail;
pub mod fallback;
pub mod guard;
pub mod records;
pub mod retry;
pub mod rollback;
pub mod state;

pub use detail::{DetailStore, DetailStoreOptions};
pub use fallback::{CachedOrError, FallbackDecision, FallbackPolicy};
pub use guard::ConfirmGuard;
pub use records::{RecordStore, RecordStoreOptions};
pub use retry::{PendingOp, RetryHandle};
pub use rollback::Compensation;
pub use state::{LoadPhase, StoreStatus};
