//! Domain configurations — one per data domain, all driving the same
//! generic store core with domain-specific record shapes, provisional
//! synthesis, local patching, and fallback behavior.

pub mod annotations;
pub mod chunks;
pub mod quality;

use crate::error::ValidationError;
use crate::types::DomainRecord;

pub use annotations::{AnnotationDomain, AnnotationStore};
pub use chunks::{ChunkDomain, ChunkStore, DEFAULT_WINDOW_LINES};
pub use quality::QualityStore;

/// A record-list domain: the record shape plus the local halves of the
/// optimistic operations (what to show before the server confirms).
pub trait Domain: Send + Sync + 'static {
    type Record: DomainRecord;
    type Input: Clone + Send + Sync + 'static;
    type Patch: Clone + Send + Sync + 'static;

    /// Domain name for logging and event labels.
    const NAME: &'static str;

    /// Synthesize the provisional record shown while a create is in flight.
    /// Must use a temporary identifier (see [`crate::types::temp_id`]).
    fn provisional(resource: &str, input: &Self::Input) -> Self::Record;

    /// Apply a patch to a local record, mirroring what the backend will do.
    fn apply_patch(record: &mut Self::Record, patch: &Self::Patch);

    /// Client-side input rejection. Default accepts everything — the
    /// backend owns real validation.
    fn validate(_input: &Self::Input) -> Result<(), ValidationError> {
        Ok(())
    }
}
