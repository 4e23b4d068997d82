//! Client — the composition root.
//!
//! Owns the three domain stores, the shared event emitter, the persisted
//! preferences, and the refresh scheduler. Everything is explicitly
//! constructed and dependency-injected; lifecycle (`new`, `reset`,
//! `teardown`) is explicit rather than implicit at module load.

use std::sync::Arc;
use std::time::Duration;

use crate::domains::annotations::{AnnotationDomain, AnnotationStore, AnnotationStoreOptions};
use crate::domains::chunks::{ChunkDomain, ChunkStore, ChunkStoreOptions};
use crate::domains::quality::{QualityStore, QualityStoreOptions};
use crate::persist::{MemoryBackend, PersistBackend, PreferenceStore, Preferences};
use crate::reactive::{EventEmitter, StoreEvent, SubscriptionId};
use crate::scheduler::RefreshScheduler;
use crate::transport::{DetailTransport, RecordTransport};
use crate::types::QualityDetail;

// ============================================================================
// Options
// ============================================================================

/// Configuration for [`Client::new`].
pub struct ClientOptions {
    pub annotations: Arc<dyn RecordTransport<AnnotationDomain>>,
    pub chunks: Arc<dyn RecordTransport<ChunkDomain>>,
    pub quality: Arc<dyn DetailTransport<QualityDetail>>,
    /// Preference storage (`None` = in-memory, lost at teardown).
    pub persist: Option<Arc<dyn PersistBackend>>,
    /// Deadline applied to every fetch (`None` = wait indefinitely).
    pub fetch_timeout: Option<Duration>,
    /// Synthetic chunk window size (`None` = 50 lines).
    pub chunk_window_lines: Option<usize>,
    /// Refresh coalescing cooldown in milliseconds (`None` = 1000).
    pub refresh_cooldown_ms: Option<u64>,
}

// ============================================================================
// Client
// ============================================================================

pub struct Client {
    pub annotations: Arc<AnnotationStore>,
    pub chunks: Arc<ChunkStore>,
    pub quality: Arc<QualityStore>,
    events: Arc<EventEmitter<StoreEvent>>,
    preferences: Arc<PreferenceStore>,
    scheduler: RefreshScheduler,
}

impl Client {
    pub fn new(options: ClientOptions) -> Self {
        let events = Arc::new(EventEmitter::new());
        let backend: Arc<dyn PersistBackend> = options
            .persist
            .unwrap_or_else(|| Arc::new(MemoryBackend::new()));
        let preferences = Arc::new(PreferenceStore::load(backend));

        let annotations = Arc::new(AnnotationStore::annotations(AnnotationStoreOptions {
            transport: options.annotations,
            events: Some(events.clone()),
            fetch_timeout: options.fetch_timeout,
        }));
        let chunks = Arc::new(ChunkStore::chunks(ChunkStoreOptions {
            transport: options.chunks,
            events: Some(events.clone()),
            fetch_timeout: options.fetch_timeout,
            window_lines: options.chunk_window_lines,
        }));
        let quality = Arc::new(QualityStore::new(QualityStoreOptions {
            transport: options.quality,
            preferences: preferences.clone(),
            events: Some(events.clone()),
            fetch_timeout: options.fetch_timeout,
        }));

        Self {
            annotations,
            chunks,
            quality,
            events,
            preferences,
            scheduler: RefreshScheduler::new(options.refresh_cooldown_ms),
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Subscribe to change notifications from every store.
    pub fn subscribe(
        &self,
        listener: impl Fn(&StoreEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.events.unsubscribe(id);
    }

    // -----------------------------------------------------------------------
    // Preferences
    // -----------------------------------------------------------------------

    pub fn preferences(&self) -> Preferences {
        self.preferences.get()
    }

    pub fn set_annotation_panel_visible(&self, visible: bool) {
        self.preferences
            .update(|p| p.annotation_panel_visible = visible);
    }

    // -----------------------------------------------------------------------
    // Coalesced refreshes
    // -----------------------------------------------------------------------

    /// Refresh annotations for `resource` through the coalescing scheduler.
    pub async fn refresh_annotations(&self, resource: &str) {
        let store = self.annotations.clone();
        let resource_owned = resource.to_string();
        let result = self
            .scheduler
            .request(&format!("annotations:{resource}"), move || {
                let store = store.clone();
                let resource = resource_owned.clone();
                async move { store.refresh(&resource).await }
            })
            .await;
        if let Err(e) = result {
            tracing::debug!(resource, error = %e, "annotation refresh not scheduled");
        }
    }

    /// Refresh chunks for `resource` through the coalescing scheduler.
    pub async fn refresh_chunks(&self, resource: &str) {
        let store = self.chunks.clone();
        let resource_owned = resource.to_string();
        let result = self
            .scheduler
            .request(&format!("chunks:{resource}"), move || {
                let store = store.clone();
                let resource = resource_owned.clone();
                async move { store.refresh(&resource).await }
            })
            .await;
        if let Err(e) = result {
            tracing::debug!(resource, error = %e, "chunk refresh not scheduled");
        }
    }

    /// Refresh quality detail for `resource` through the coalescing
    /// scheduler.
    pub async fn refresh_quality(&self, resource: &str) {
        let store = self.quality.clone();
        let resource_owned = resource.to_string();
        let result = self
            .scheduler
            .request(&format!("quality:{resource}"), move || {
                let store = store.clone();
                let resource = resource_owned.clone();
                async move { store.refresh(&resource).await }
            })
            .await;
        if let Err(e) = result {
            tracing::debug!(resource, error = %e, "quality refresh not scheduled");
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Drop every store back to `Idle` and empty every cache. Preferences
    /// are kept — they belong to the user, not the session.
    pub fn reset(&self) {
        self.annotations.reset();
        self.annotations.clear_cache();
        self.chunks.reset();
        self.chunks.clear_cache();
        self.quality.reset();
        self.quality.clear_cache();
    }

    /// Tear the client down: stores to `Idle`, scheduler disposed. The
    /// client is inert afterwards; build a new one to continue.
    pub fn teardown(&self) {
        self.scheduler.dispose();
        self.annotations.reset();
        self.chunks.reset();
        self.quality.reset();
    }
}
