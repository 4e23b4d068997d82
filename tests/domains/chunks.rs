//! Chunk store scenarios: windowed synthetic fallback and its determinism.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use scholia::domains::chunks::{
    window_chunks, ChunkDomain, ChunkStore, ChunkStoreOptions, DEFAULT_WINDOW_LINES,
};
use scholia::error::TransportError;
use scholia::store::LoadPhase;
use scholia::transport::RecordTransport;
use scholia::types::{Chunk, ChunkInput, ChunkPatch};

// ============================================================================
// Mock transport
// ============================================================================

type ListFn = dyn Fn(&str) -> Result<Vec<Chunk>, TransportError> + Send + Sync;

#[derive(Default)]
struct MockTransport {
    list_response: Mutex<Option<Box<ListFn>>>,
}

impl MockTransport {
    fn new() -> Self {
        Self::default()
    }

    fn on_list(
        &self,
        f: impl Fn(&str) -> Result<Vec<Chunk>, TransportError> + Send + Sync + 'static,
    ) {
        *self.list_response.lock() = Some(Box::new(f));
    }
}

#[async_trait]
impl RecordTransport<ChunkDomain> for MockTransport {
    async fn list(&self, resource: &str) -> Result<Vec<Chunk>, TransportError> {
        let guard = self.list_response.lock();
        match guard.as_ref() {
            Some(f) => f(resource),
            None => Ok(Vec::new()),
        }
    }

    async fn create(&self, resource: &str, input: &ChunkInput) -> Result<Chunk, TransportError> {
        Ok(Chunk {
            id: "srv-1".to_string(),
            resource: resource.to_string(),
            start_line: input.start_line,
            end_line: input.end_line,
            summary: input.summary.clone(),
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        })
    }

    async fn update(
        &self,
        _resource: &str,
        _id: &str,
        _patch: &ChunkPatch,
    ) -> Result<Chunk, TransportError> {
        Err(TransportError::http(500, "no update scripted"))
    }

    async fn delete(&self, _resource: &str, _id: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

fn store_with(transport: Arc<MockTransport>, window: Option<usize>) -> ChunkStore {
    ChunkStore::chunks(ChunkStoreOptions {
        transport,
        events: None,
        fetch_timeout: None,
        window_lines: window,
    })
}

fn content_of(lines: usize) -> String {
    (1..=lines).map(|i| format!("line {i}\n")).collect()
}

// ============================================================================
// Windowing determinism
// ============================================================================

#[test]
fn window_count_is_ceil_of_lines_over_window() {
    for (lines, expected) in [(1, 1), (49, 1), (50, 1), (51, 2), (100, 2), (101, 3), (237, 5)] {
        let chunks = window_chunks("doc", &content_of(lines), DEFAULT_WINDOW_LINES);
        assert_eq!(chunks.len(), expected, "N = {lines}");
    }
}

#[test]
fn window_ranges_tile_the_document() {
    let chunks = window_chunks("doc", &content_of(237), 50);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.start_line as usize, 50 * i + 1);
        assert_eq!(chunk.end_line as usize, (50 * (i + 1)).min(237));
    }
    assert_eq!(chunks.last().unwrap().end_line, 237);
}

#[test]
fn exact_multiple_has_full_final_window() {
    let chunks = window_chunks("doc", &content_of(100), 50);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].start_line, 51);
    assert_eq!(chunks[1].end_line, 100);
}

#[test]
fn empty_content_yields_no_chunks() {
    assert!(window_chunks("doc", "", 50).is_empty());
}

// ============================================================================
// Fallback behavior
// ============================================================================

#[tokio::test]
async fn fetch_failure_with_source_synthesizes_windows() {
    let transport = Arc::new(MockTransport::new());
    transport.on_list(|_| Err(TransportError::network("offline")));
    let store = store_with(transport, None);

    let content = content_of(120);
    store.fetch_with_source("doc-1", &content).await;

    let status = store.status();
    assert_eq!(status.phase, LoadPhase::SyntheticFallback);
    assert!(status.using_fallback);
    assert!(!status.using_cached_data);
    assert!(status.error.is_some());

    let chunks = store.records();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[2].start_line, 101);
    assert_eq!(chunks[2].end_line, 120);
}

#[tokio::test]
async fn synthesized_windows_are_cached_like_a_fetch_result() {
    let transport = Arc::new(MockTransport::new());
    transport.on_list(|_| Err(TransportError::network("offline")));
    let store = store_with(transport, None);

    store.fetch_with_source("doc-1", &content_of(60)).await;

    let cached = store.cache().get("doc-1").unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached, store.records());
}

#[tokio::test]
async fn fetch_failure_without_source_is_a_hard_error() {
    let transport = Arc::new(MockTransport::new());
    transport.on_list(|_| Err(TransportError::http(503, "unavailable")));
    let store = store_with(transport, None);

    store.fetch("doc-1").await;

    assert_eq!(store.status().phase, LoadPhase::HardError);
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn custom_window_size_is_honored() {
    let transport = Arc::new(MockTransport::new());
    transport.on_list(|_| Err(TransportError::network("offline")));
    let store = store_with(transport, Some(10));

    store.fetch_with_source("doc-1", &content_of(25)).await;

    let chunks = store.records();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1].start_line, 11);
    assert_eq!(chunks[1].end_line, 20);
    assert_eq!(chunks[2].end_line, 25);
}

#[tokio::test]
async fn fetch_success_replaces_synthetic_fallback() {
    let transport = Arc::new(MockTransport::new());
    transport.on_list(|_| Err(TransportError::network("offline")));
    let store = store_with(transport.clone(), None);

    store.fetch_with_source("doc-1", &content_of(60)).await;
    assert!(store.status().using_fallback);

    transport.on_list(|r| {
        Ok(vec![Chunk {
            id: "c1".to_string(),
            resource: r.to_string(),
            start_line: 1,
            end_line: 60,
            summary: Some("whole file".to_string()),
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        }])
    });
    // The synthetic result was cached, so a retry must bypass the cache.
    store.retry().await;

    let status = store.status();
    assert_eq!(status.phase, LoadPhase::Success);
    assert!(!status.using_fallback);
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.records()[0].id, "c1");
}
