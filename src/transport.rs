//! Transport traits — the network seam between stores and the backend.
//!
//! Implementations own authentication, base URLs, and HTTP details; this
//! crate only sees the calls below. No retries happen at this layer — retry
//! is the store's pending-operation machinery.

use async_trait::async_trait;

use crate::domains::Domain;
use crate::error::TransportError;

/// Network operations for a record-list domain (annotations, chunks).
///
/// Every method suspends cooperatively until the backend responds and fails
/// with a [`TransportError`] on non-success status or transport failure.
#[async_trait]
pub trait RecordTransport<D: Domain>: Send + Sync {
    /// List all records for one resource.
    async fn list(&self, resource: &str) -> Result<Vec<D::Record>, TransportError>;

    /// Create a record. The returned record carries the server-assigned
    /// identifier that replaces the provisional one.
    async fn create(&self, resource: &str, input: &D::Input)
        -> Result<D::Record, TransportError>;

    /// Apply a partial update. Returns the server's post-update record.
    async fn update(
        &self,
        resource: &str,
        id: &str,
        patch: &D::Patch,
    ) -> Result<D::Record, TransportError>;

    /// Delete a record.
    async fn delete(&self, resource: &str, id: &str) -> Result<(), TransportError>;
}

/// Network fetch for a single-payload domain (quality detail).
#[async_trait]
pub trait DetailTransport<P>: Send + Sync {
    async fn fetch(&self, resource: &str) -> Result<P, TransportError>;
}
