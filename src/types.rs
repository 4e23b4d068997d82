use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifier and timestamp helpers
// ---------------------------------------------------------------------------

/// Prefix marking a provisional (not yet server-confirmed) record identifier.
pub const TEMP_ID_PREFIX: &str = "tmp-";

/// Generate a provisional record identifier.
pub fn temp_id() -> String {
    format!("{TEMP_ID_PREFIX}{}", uuid::Uuid::new_v4())
}

/// Whether an identifier is provisional (swapped for the server-assigned id
/// on create confirmation).
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Current timestamp as an RFC 3339 string (the wire format for all
/// `created_at` / `updated_at` fields).
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

// ---------------------------------------------------------------------------
// DomainRecord
// ---------------------------------------------------------------------------

/// A record managed by the optimistic-mutation core.
///
/// The store only needs identity — everything else about a record's shape is
/// domain business.
pub trait DomainRecord: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// A highlighted range with a note, attached to one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    /// Document the annotation belongs to.
    pub resource: String,
    pub start_line: u32,
    pub end_line: u32,
    pub note: String,
    pub tags: Vec<String>,
    pub color: Option<String>,
    /// Owner, as reported by the backend. `None` for provisional records.
    pub author: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl DomainRecord for Annotation {
    fn id(&self) -> &str {
        &self.id
    }
}

/// User input for creating an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationInput {
    pub start_line: u32,
    pub end_line: u32,
    pub note: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Partial update for an annotation. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPatch {
    pub note: Option<String>,
    pub tags: Option<Vec<String>>,
    pub color: Option<String>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
}

// ---------------------------------------------------------------------------
// Chunk
// ---------------------------------------------------------------------------

/// A contiguous line range of a document, as segmented by the backend (or
/// synthesized locally when the backend is unreachable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub resource: String,
    /// 1-based, inclusive.
    pub start_line: u32,
    /// 1-based, inclusive.
    pub end_line: u32,
    pub summary: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl DomainRecord for Chunk {
    fn id(&self) -> &str {
        &self.id
    }
}

/// User input for creating a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkInput {
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Partial update for a chunk. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkPatch {
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// QualityDetail
// ---------------------------------------------------------------------------

/// Server-computed quality scores for one document. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityDetail {
    pub resource: String,
    /// Aggregate score in `[0, 1]`.
    pub overall: f64,
    /// Per-dimension scores (e.g. "documentation", "test_coverage").
    pub dimensions: BTreeMap<String, f64>,
    pub computed_at: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
