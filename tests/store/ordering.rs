//! Out-of-order completion handling.
//!
//! The original design left confirmations unordered: a slow confirming call
//! for an earlier operation could resolve after a later operation had
//! already applied, silently overwriting the newer state. This suite pins
//! down the hardened behavior chosen here instead: completions carry a
//! monotonic epoch (per resource for fetches, per record for mutations) and
//! stale completions are discarded — the later state always wins.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use scholia::domains::annotations::{AnnotationDomain, AnnotationStore, AnnotationStoreOptions};
use scholia::error::TransportError;
use scholia::store::LoadPhase;
use scholia::transport::RecordTransport;
use scholia::types::{Annotation, AnnotationInput, AnnotationPatch};

// ============================================================================
// Gated transport — each scripted call optionally waits on a Notify
// ============================================================================

struct Scripted<T> {
    gate: Option<Arc<Notify>>,
    result: Result<T, TransportError>,
}

#[derive(Default)]
struct GateTransport {
    lists: Mutex<VecDeque<Scripted<Vec<Annotation>>>>,
    creates: Mutex<VecDeque<Scripted<Annotation>>>,
    updates: Mutex<VecDeque<Scripted<Annotation>>>,
}

impl GateTransport {
    fn new() -> Self {
        Self::default()
    }

    fn script_list(&self, gate: Option<Arc<Notify>>, result: Result<Vec<Annotation>, TransportError>) {
        self.lists.lock().push_back(Scripted { gate, result });
    }

    fn script_create(&self, gate: Option<Arc<Notify>>, result: Result<Annotation, TransportError>) {
        self.creates.lock().push_back(Scripted { gate, result });
    }

    fn script_update(&self, gate: Option<Arc<Notify>>, result: Result<Annotation, TransportError>) {
        self.updates.lock().push_back(Scripted { gate, result });
    }
}

async fn run<T>(scripted: Scripted<T>) -> Result<T, TransportError> {
    if let Some(gate) = scripted.gate {
        gate.notified().await;
    }
    scripted.result
}

#[async_trait]
impl RecordTransport<AnnotationDomain> for GateTransport {
    async fn list(&self, _resource: &str) -> Result<Vec<Annotation>, TransportError> {
        let scripted = self.lists.lock().pop_front().expect("unscripted list call");
        run(scripted).await
    }

    async fn create(
        &self,
        _resource: &str,
        _input: &AnnotationInput,
    ) -> Result<Annotation, TransportError> {
        let scripted = self.creates.lock().pop_front().expect("unscripted create call");
        run(scripted).await
    }

    async fn update(
        &self,
        _resource: &str,
        _id: &str,
        _patch: &AnnotationPatch,
    ) -> Result<Annotation, TransportError> {
        let scripted = self.updates.lock().pop_front().expect("unscripted update call");
        run(scripted).await
    }

    async fn delete(&self, _resource: &str, _id: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

fn ann(id: &str, note: &str) -> Annotation {
    Annotation {
        id: id.to_string(),
        resource: "r1".to_string(),
        start_line: 1,
        end_line: 1,
        note: note.to_string(),
        tags: Vec::new(),
        color: None,
        author: None,
        created_at: "2026-01-01T00:00:00+00:00".to_string(),
        updated_at: "2026-01-01T00:00:00+00:00".to_string(),
    }
}

fn store_with(transport: Arc<GateTransport>) -> Arc<AnnotationStore> {
    Arc::new(AnnotationStore::annotations(AnnotationStoreOptions {
        transport,
        events: None,
        fetch_timeout: None,
    }))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn slow_fetch_completion_does_not_overwrite_newer_fetch() {
    let transport = Arc::new(GateTransport::new());
    let gate = Arc::new(Notify::new());
    transport.script_list(Some(gate.clone()), Ok(vec![ann("a1", "stale")]));
    transport.script_list(None, Ok(vec![ann("a2", "fresh")]));
    let store = store_with(transport);

    let slow = tokio::spawn({
        let store = store.clone();
        async move { store.fetch("r1").await }
    });
    tokio::task::yield_now().await; // slow fetch is now parked at the gate

    store.refresh("r1").await;
    assert_eq!(store.records()[0].note, "fresh");

    gate.notify_one();
    slow.await.unwrap();

    // The slow completion was stale and discarded.
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.records()[0].note, "fresh");
    assert_eq!(store.status().phase, LoadPhase::Success);
}

#[tokio::test]
async fn stale_mutation_failure_does_not_roll_back_newer_state() {
    let transport = Arc::new(GateTransport::new());
    let gate = Arc::new(Notify::new());
    transport.script_list(None, Ok(vec![ann("a1", "original")]));
    // First update hangs then fails; second settles immediately.
    transport.script_update(Some(gate.clone()), Err(TransportError::network("offline")));
    transport.script_update(None, Ok(ann("a1", "second")));
    let store = store_with(transport);

    store.fetch("r1").await;

    let slow = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .update(
                    "a1",
                    AnnotationPatch {
                        note: Some("first".to_string()),
                        ..Default::default()
                    },
                )
                .await
        }
    });
    tokio::task::yield_now().await;

    store
        .update(
            "a1",
            AnnotationPatch {
                note: Some("second".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(store.records()[0].note, "second");

    gate.notify_one();
    slow.await.unwrap();

    // The stale failure neither rolled back to "original" nor restored the
    // first patch; the failure itself is still surfaced.
    assert_eq!(store.records()[0].note, "second");
    assert!(store.status().error.is_some());
}

#[tokio::test]
async fn mutation_supersedes_an_in_flight_fetch() {
    let transport = Arc::new(GateTransport::new());
    let gate = Arc::new(Notify::new());
    // Server list predates the create and would erase its result.
    transport.script_list(Some(gate.clone()), Ok(Vec::new()));
    transport.script_create(None, Ok(ann("srv-1", "kept")));
    let store = store_with(transport);

    let slow = tokio::spawn({
        let store = store.clone();
        async move { store.fetch("r1").await }
    });
    tokio::task::yield_now().await;

    store
        .create(
            "r1",
            AnnotationInput {
                start_line: 1,
                end_line: 1,
                note: "kept".to_string(),
                tags: Vec::new(),
                color: None,
            },
        )
        .await;
    assert_eq!(store.records().len(), 1);

    gate.notify_one();
    slow.await.unwrap();

    // The fetch that began before the mutation is stale; the confirmed
    // record stays.
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.records()[0].id, "srv-1");
}

#[tokio::test]
async fn reset_invalidates_in_flight_completions() {
    let transport = Arc::new(GateTransport::new());
    let gate = Arc::new(Notify::new());
    transport.script_list(Some(gate.clone()), Ok(vec![ann("a1", "late")]));
    let store = store_with(transport);

    let slow = tokio::spawn({
        let store = store.clone();
        async move { store.fetch("r1").await }
    });
    tokio::task::yield_now().await;

    store.reset();
    gate.notify_one();
    slow.await.unwrap();

    assert_eq!(store.status().phase, LoadPhase::Idle);
    assert!(store.records().is_empty());
}
