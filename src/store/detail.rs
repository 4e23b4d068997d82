//! DetailStore — fetch-only store for a single per-resource payload.
//!
//! The quality domain's shape: no mutations, and failure degrades silently.
//! A failed fetch clears the payload and raises a hide flag for the UI
//! affordance that depends on it; it never produces a blocking error state
//! for unrelated UI.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::DocumentCache;
use crate::error::TransportError;
use crate::reactive::{EventEmitter, StoreEvent};
use crate::transport::DetailTransport;

use super::guard::{fetch_key, ConfirmGuard};
use super::retry::{PendingOp, RetryHandle};
use super::state::{LoadPhase, StoreStatus};

// ============================================================================
// Options / View
// ============================================================================

/// Configuration for [`DetailStore`].
pub struct DetailStoreOptions<P> {
    pub transport: Arc<dyn DetailTransport<P>>,
    /// Domain name for logging and event labels.
    pub name: &'static str,
    pub events: Option<Arc<EventEmitter<StoreEvent>>>,
    pub fetch_timeout: Option<Duration>,
}

struct DetailView<P> {
    resource: Option<String>,
    data: Option<P>,
    status: StoreStatus,
    /// Raised when a failed fetch cleared the payload; tells the UI to hide
    /// the affordance that renders it. Cleared by a successful fetch or an
    /// explicit visibility action.
    hidden_due_to_error: bool,
}

impl<P> DetailView<P> {
    fn new() -> Self {
        Self {
            resource: None,
            data: None,
            status: StoreStatus::idle(),
            hidden_due_to_error: false,
        }
    }
}

// ============================================================================
// DetailStore
// ============================================================================

pub struct DetailStore<P: Clone + Send + Sync + 'static> {
    transport: Arc<dyn DetailTransport<P>>,
    name: &'static str,
    events: Arc<EventEmitter<StoreEvent>>,
    fetch_timeout: Option<Duration>,
    cache: DocumentCache<P>,
    view: Mutex<DetailView<P>>,
    retry: RetryHandle<(), ()>,
    guard: ConfirmGuard,
}

impl<P: Clone + Send + Sync + 'static> DetailStore<P> {
    pub fn new(options: DetailStoreOptions<P>) -> Self {
        Self {
            transport: options.transport,
            name: options.name,
            events: options.events.unwrap_or_default(),
            fetch_timeout: options.fetch_timeout,
            cache: DocumentCache::new(),
            view: Mutex::new(DetailView::new()),
            retry: RetryHandle::new(),
            guard: ConfirmGuard::new(),
        }
    }

    // -----------------------------------------------------------------------
    // State getters
    // -----------------------------------------------------------------------

    /// Payload currently on screen, if any.
    pub fn data(&self) -> Option<P> {
        self.view.lock().data.clone()
    }

    pub fn status(&self) -> StoreStatus {
        self.view.lock().status.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.view.lock().status.is_loading()
    }

    pub fn current_resource(&self) -> Option<String> {
        self.view.lock().resource.clone()
    }

    /// Whether a fetch failure hid the dependent UI affordance.
    pub fn hidden_due_to_error(&self) -> bool {
        self.view.lock().hidden_due_to_error
    }

    pub fn cache(&self) -> &DocumentCache<P> {
        &self.cache
    }

    // -----------------------------------------------------------------------
    // Fetch
    // -----------------------------------------------------------------------

    /// Load `resource`, serving the cache entry without a network call when
    /// one exists.
    pub async fn fetch(&self, resource: &str) {
        self.fetch_inner(resource, false).await;
    }

    /// Load `resource` from the network even when a cache entry exists.
    pub async fn refresh(&self, resource: &str) {
        self.fetch_inner(resource, true).await;
    }

    async fn fetch_inner(&self, resource: &str, bypass_cache: bool) {
        let epoch = self.guard.begin(&fetch_key(resource));
        self.retry.record(PendingOp::Fetch {
            resource: resource.to_string(),
            source: None,
        });

        {
            let mut view = self.view.lock();
            if view.resource.as_deref() != Some(resource) {
                view.resource = Some(resource.to_string());
                view.data = None;
                view.status.reset();
                view.hidden_due_to_error = false;
            }
            view.status.begin_loading();
        }
        self.events.emit(&StoreEvent::FetchStarted {
            domain: self.name,
            resource: resource.to_string(),
        });

        if !bypass_cache {
            if let Some(cached) = self.cache.get(resource) {
                {
                    let mut view = self.view.lock();
                    view.data = Some(cached);
                    view.status.succeed();
                    view.hidden_due_to_error = false;
                }
                self.retry.clear();
                self.settled(resource, LoadPhase::Success);
                return;
            }
        }

        let result = self.fetch_from_transport(resource).await;

        if !self.guard.is_current(&fetch_key(resource), epoch) {
            tracing::debug!(domain = self.name, resource, "discarding stale fetch completion");
            return;
        }

        let phase = match result {
            Ok(payload) => {
                self.cache.set(resource, payload.clone());
                let mut view = self.view.lock();
                view.data = Some(payload);
                view.status.succeed();
                view.hidden_due_to_error = false;
                self.retry.clear();
                view.status.phase
            }
            Err(e) => {
                // Silent degradation: clear the payload and hide the
                // affordance; unrelated UI keeps rendering.
                tracing::warn!(domain = self.name, resource, error = %e, "hiding indicators after failed fetch");
                let mut view = self.view.lock();
                view.data = None;
                view.status.fail(e.to_string());
                view.hidden_due_to_error = true;
                view.status.phase
            }
        };
        self.settled(resource, phase);
    }

    async fn fetch_from_transport(&self, resource: &str) -> Result<P, TransportError> {
        match self.fetch_timeout {
            Some(deadline) => {
                match tokio::time::timeout(deadline, self.transport.fetch(resource)).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::timeout(format!(
                        "fetch {} for {resource}",
                        self.name
                    ))),
                }
            }
            None => self.transport.fetch(resource).await,
        }
    }

    // -----------------------------------------------------------------------
    // Retry / dismiss / reset
    // -----------------------------------------------------------------------

    /// Re-execute the recorded fetch. No-op when nothing is recorded.
    pub async fn retry(&self) {
        let Some(PendingOp::Fetch { resource, .. }) = self.retry.current() else {
            return;
        };
        self.fetch_inner(&resource, true).await;
    }

    /// Dismiss the error without retrying. Leaves the hide flag alone —
    /// that is cleared by a successful fetch or an explicit visibility
    /// action.
    pub fn clear_error(&self) {
        let resource = {
            let mut view = self.view.lock();
            view.status.clear_error();
            view.resource.clone()
        };
        if let Some(resource) = resource {
            self.events.emit(&StoreEvent::ErrorCleared {
                domain: self.name,
                resource,
            });
        }
    }

    /// Explicit visibility action: drop the error-driven hide flag.
    pub fn show_indicators(&self) {
        self.view.lock().hidden_due_to_error = false;
    }

    /// Drop the view back to `Idle`; cache intact, in-flight completions
    /// become stale.
    pub fn reset(&self) {
        {
            let mut view = self.view.lock();
            view.resource = None;
            view.data = None;
            view.status.reset();
            view.hidden_due_to_error = false;
        }
        self.retry.clear();
        self.guard.clear();
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn settled(&self, resource: &str, phase: LoadPhase) {
        self.events.emit(&StoreEvent::FetchSettled {
            domain: self.name,
            resource: resource.to_string(),
            phase,
        });
    }
}
