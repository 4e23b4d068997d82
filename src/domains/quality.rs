//! Quality domain — read-only scores with silent degradation.
//!
//! Scores are computed server-side; the client only fetches. A failed fetch
//! hides the quality badges instead of raising a banner, and the
//! user-controlled visibility preference persists across sessions.

use std::sync::Arc;
use std::time::Duration;

use crate::persist::PreferenceStore;
use crate::reactive::{EventEmitter, StoreEvent};
use crate::store::{DetailStore, DetailStoreOptions, StoreStatus};
use crate::transport::DetailTransport;
use crate::types::QualityDetail;

/// Configuration for [`QualityStore`].
pub struct QualityStoreOptions {
    pub transport: Arc<dyn DetailTransport<QualityDetail>>,
    pub preferences: Arc<PreferenceStore>,
    pub events: Option<Arc<EventEmitter<StoreEvent>>>,
    pub fetch_timeout: Option<Duration>,
}

/// A [`DetailStore`] over [`QualityDetail`] plus the badge-visibility
/// preference.
pub struct QualityStore {
    inner: DetailStore<QualityDetail>,
    preferences: Arc<PreferenceStore>,
}

impl QualityStore {
    pub fn new(options: QualityStoreOptions) -> Self {
        Self {
            inner: DetailStore::new(DetailStoreOptions {
                transport: options.transport,
                name: "quality",
                events: options.events,
                fetch_timeout: options.fetch_timeout,
            }),
            preferences: options.preferences,
        }
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    pub async fn fetch(&self, resource: &str) {
        self.inner.fetch(resource).await;
    }

    pub async fn refresh(&self, resource: &str) {
        self.inner.refresh(resource).await;
    }

    pub async fn retry(&self) {
        self.inner.retry().await;
    }

    pub fn clear_error(&self) {
        self.inner.clear_error();
    }

    pub fn reset(&self) {
        self.inner.reset();
    }

    pub fn clear_cache(&self) {
        self.inner.clear_cache();
    }

    /// Set the user's badge-visibility preference. An explicit visibility
    /// choice supersedes (and clears) the error-driven hide flag.
    pub fn set_badge_visibility(&self, visible: bool) {
        self.preferences
            .update(|p| p.quality_badges_visible = visible);
        self.inner.show_indicators();
    }

    // -----------------------------------------------------------------------
    // State getters
    // -----------------------------------------------------------------------

    /// Quality detail currently on screen, if any.
    pub fn data(&self) -> Option<QualityDetail> {
        self.inner.data()
    }

    pub fn status(&self) -> StoreStatus {
        self.inner.status()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    pub fn current_resource(&self) -> Option<String> {
        self.inner.current_resource()
    }

    /// Whether a fetch failure is currently hiding the badges.
    pub fn hidden_due_to_error(&self) -> bool {
        self.inner.hidden_due_to_error()
    }

    /// Effective visibility: the user preference gated by the error-driven
    /// hide flag. This is the single bit the badge UI renders from.
    pub fn badges_visible(&self) -> bool {
        self.preferences.get().quality_badges_visible && !self.inner.hidden_due_to_error()
    }
}
