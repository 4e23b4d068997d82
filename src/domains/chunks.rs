//! Chunk domain — optimistic CRUD with windowed synthetic fallback.
//!
//! When the backend cannot be reached and the caller supplied the raw file
//! content, the document is partitioned into fixed-size line windows so the
//! editor keeps a usable (if coarse) segmentation.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ValidationError;
use crate::reactive::{EventEmitter, StoreEvent};
use crate::store::{FallbackDecision, FallbackPolicy, RecordStore, RecordStoreOptions};
use crate::transport::RecordTransport;
use crate::types::{now_rfc3339, temp_id, Chunk, ChunkInput, ChunkPatch};

use super::Domain;

/// Window size for synthesized chunks, in lines.
pub const DEFAULT_WINDOW_LINES: usize = 50;

pub struct ChunkDomain;

impl Domain for ChunkDomain {
    type Record = Chunk;
    type Input = ChunkInput;
    type Patch = ChunkPatch;

    const NAME: &'static str = "chunks";

    fn provisional(resource: &str, input: &ChunkInput) -> Chunk {
        let now = now_rfc3339();
        Chunk {
            id: temp_id(),
            resource: resource.to_string(),
            start_line: input.start_line,
            end_line: input.end_line,
            summary: input.summary.clone(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    fn apply_patch(record: &mut Chunk, patch: &ChunkPatch) {
        if let Some(start_line) = patch.start_line {
            record.start_line = start_line;
        }
        if let Some(end_line) = patch.end_line {
            record.end_line = end_line;
        }
        if let Some(summary) = &patch.summary {
            record.summary = Some(summary.clone());
        }
        record.updated_at = now_rfc3339();
    }

    fn validate(input: &ChunkInput) -> Result<(), ValidationError> {
        if input.start_line == 0 {
            return Err(ValidationError::new("start_line", "lines are 1-based"));
        }
        if input.end_line < input.start_line {
            return Err(ValidationError::new(
                "end_line",
                "must not precede start_line",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Synthetic windowing
// ============================================================================

/// Partition `content` into chunks of `window` lines.
///
/// For N lines this yields `ceil(N / window)` chunks; chunk `i` (0-based)
/// covers lines `[window*i + 1, min(window*(i+1), N)]`, 1-based inclusive.
/// Empty content yields no chunks.
pub fn window_chunks(resource: &str, content: &str, window: usize) -> Vec<Chunk> {
    let total = content.lines().count();
    if total == 0 || window == 0 {
        return Vec::new();
    }

    let now = now_rfc3339();
    (0..total.div_ceil(window))
        .map(|i| {
            let start = window * i + 1;
            let end = (window * (i + 1)).min(total);
            Chunk {
                id: format!("fallback-{}", i + 1),
                resource: resource.to_string(),
                start_line: start as u32,
                end_line: end as u32,
                summary: None,
                created_at: now.clone(),
                updated_at: now.clone(),
            }
        })
        .collect()
}

/// Synthesize windows from caller-supplied file content; hard error when no
/// content is available. The chunk domain's policy.
pub struct WindowedFallback {
    pub window_lines: usize,
}

impl FallbackPolicy<Chunk> for WindowedFallback {
    fn resolve(
        &self,
        resource: &str,
        _cached: Option<Vec<Chunk>>,
        source: Option<&str>,
    ) -> FallbackDecision<Chunk> {
        match source {
            Some(content) => {
                FallbackDecision::Synthesized(window_chunks(resource, content, self.window_lines))
            }
            None => FallbackDecision::Exhausted,
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// The chunk store: a [`RecordStore`] configured with windowed fallback.
pub type ChunkStore = RecordStore<ChunkDomain>;

/// Configuration for [`ChunkStore::chunks`].
pub struct ChunkStoreOptions {
    pub transport: Arc<dyn RecordTransport<ChunkDomain>>,
    pub events: Option<Arc<EventEmitter<StoreEvent>>>,
    pub fetch_timeout: Option<Duration>,
    /// Synthetic window size (`None` = [`DEFAULT_WINDOW_LINES`]).
    pub window_lines: Option<usize>,
}

impl ChunkStore {
    pub fn chunks(options: ChunkStoreOptions) -> Self {
        RecordStore::new(RecordStoreOptions {
            transport: options.transport,
            policy: Arc::new(WindowedFallback {
                window_lines: options.window_lines.unwrap_or(DEFAULT_WINDOW_LINES),
            }),
            events: options.events,
            fetch_timeout: options.fetch_timeout,
        })
    }
}
