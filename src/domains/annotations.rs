//! Annotation domain — full optimistic CRUD, cached-or-error fallback.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ValidationError;
use crate::reactive::{EventEmitter, StoreEvent};
use crate::store::{CachedOrError, RecordStore, RecordStoreOptions};
use crate::transport::RecordTransport;
use crate::types::{now_rfc3339, temp_id, Annotation, AnnotationInput, AnnotationPatch};

use super::Domain;

pub struct AnnotationDomain;

impl Domain for AnnotationDomain {
    type Record = Annotation;
    type Input = AnnotationInput;
    type Patch = AnnotationPatch;

    const NAME: &'static str = "annotations";

    fn provisional(resource: &str, input: &AnnotationInput) -> Annotation {
        let now = now_rfc3339();
        Annotation {
            id: temp_id(),
            resource: resource.to_string(),
            start_line: input.start_line,
            end_line: input.end_line,
            note: input.note.clone(),
            tags: input.tags.clone(),
            color: input.color.clone(),
            // Ownership is server-assigned; unknown until confirmation.
            author: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    fn apply_patch(record: &mut Annotation, patch: &AnnotationPatch) {
        if let Some(note) = &patch.note {
            record.note = note.clone();
        }
        if let Some(tags) = &patch.tags {
            record.tags = tags.clone();
        }
        if let Some(color) = &patch.color {
            record.color = Some(color.clone());
        }
        if let Some(start_line) = patch.start_line {
            record.start_line = start_line;
        }
        if let Some(end_line) = patch.end_line {
            record.end_line = end_line;
        }
        record.updated_at = now_rfc3339();
    }

    fn validate(input: &AnnotationInput) -> Result<(), ValidationError> {
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

/// The annotation store: a [`RecordStore`] configured with the
/// cached-or-error fallback policy.
pub type AnnotationStore = RecordStore<AnnotationDomain>;

/// Configuration for [`AnnotationStore::annotations`].
pub struct AnnotationStoreOptions {
    pub transport: Arc<dyn RecordTransport<AnnotationDomain>>,
    pub events: Option<Arc<EventEmitter<StoreEvent>>>,
    pub fetch_timeout: Option<Duration>,
}

impl AnnotationStore {
    pub fn annotations(options: AnnotationStoreOptions) -> Self {
        RecordStore::new(RecordStoreOptions {
            transport: options.transport,
            policy: Arc::new(CachedOrError),
            events: options.events,
            fetch_timeout: options.fetch_timeout,
        })
    }
}
