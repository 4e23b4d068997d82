//! Deadline abort: an in-flight fetch past its deadline is abandoned and
//! reported as a timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use scholia::domains::annotations::{AnnotationDomain, AnnotationStore, AnnotationStoreOptions};
use scholia::error::TransportError;
use scholia::store::LoadPhase;
use scholia::transport::RecordTransport;
use scholia::types::{Annotation, AnnotationInput, AnnotationPatch};

/// A transport whose responses never arrive.
struct StalledTransport;

#[async_trait]
impl RecordTransport<AnnotationDomain> for StalledTransport {
    async fn list(&self, _resource: &str) -> Result<Vec<Annotation>, TransportError> {
        std::future::pending().await
    }

    async fn create(
        &self,
        _resource: &str,
        _input: &AnnotationInput,
    ) -> Result<Annotation, TransportError> {
        std::future::pending().await
    }

    async fn update(
        &self,
        _resource: &str,
        _id: &str,
        _patch: &AnnotationPatch,
    ) -> Result<Annotation, TransportError> {
        std::future::pending().await
    }

    async fn delete(&self, _resource: &str, _id: &str) -> Result<(), TransportError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn fetch_past_deadline_reports_a_timeout() {
    let store = AnnotationStore::annotations(AnnotationStoreOptions {
        transport: Arc::new(StalledTransport),
        events: None,
        fetch_timeout: Some(Duration::from_secs(5)),
    });

    store.fetch("doc-1").await;

    let status = store.status();
    assert_eq!(status.phase, LoadPhase::HardError);
    assert!(status.error.as_deref().unwrap().contains("timed out"));
}

#[tokio::test(start_paused = true)]
async fn timed_out_fetch_still_degrades_through_the_cache() {
    let store = AnnotationStore::annotations(AnnotationStoreOptions {
        transport: Arc::new(StalledTransport),
        events: None,
        fetch_timeout: Some(Duration::from_secs(5)),
    });

    store.cache().set(
        "doc-1",
        vec![Annotation {
            id: "a1".to_string(),
            resource: "doc-1".to_string(),
            start_line: 1,
            end_line: 1,
            note: "cached".to_string(),
            tags: Vec::new(),
            color: None,
            author: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        }],
    );

    store.refresh("doc-1").await;

    let status = store.status();
    assert_eq!(status.phase, LoadPhase::CachedFallback);
    assert!(status.using_cached_data);
    assert_eq!(store.records().len(), 1);
}
