//! RecordStore — fetch, cache, and optimistic CRUD over one record list.
//!
//! The generic half of every record-list domain. Public methods never
//! return `Err` — failures are translated into [`StoreStatus`] flags that
//! the presentation layer reads. Locks are never held across `.await` or
//! while emitting events.
//!
//! Ordering: each attempt registers an epoch with [`ConfirmGuard`]; a
//! completion that lost its epoch (a newer fetch, mutation, or reset began
//! meanwhile) is discarded instead of overwriting newer state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::DocumentCache;
use crate::domains::Domain;
use crate::error::{StoreError, TransportError};
use crate::reactive::{EventEmitter, StoreEvent};
use crate::transport::RecordTransport;
use crate::types::{is_temp_id, DomainRecord};

use super::fallback::{FallbackDecision, FallbackPolicy};
use super::guard::{fetch_key, record_key, ConfirmGuard};
use super::retry::{PendingOp, RetryHandle};
use super::rollback::{insert_provisional, patch_record, remove_record, Compensation};
use super::state::{LoadPhase, StoreStatus};

// ============================================================================
// Options / View
// ============================================================================

/// Configuration for [`RecordStore`].
pub struct RecordStoreOptions<D: Domain> {
    pub transport: Arc<dyn RecordTransport<D>>,
    pub policy: Arc<dyn FallbackPolicy<D::Record>>,
    /// Shared emitter for change notifications (`None` = store-private).
    pub events: Option<Arc<EventEmitter<StoreEvent>>>,
    /// Deadline for fetches; an elapsed deadline abandons the in-flight
    /// call and reports a timeout. `None` = wait indefinitely.
    pub fetch_timeout: Option<Duration>,
}

/// The store's view of the currently loaded resource.
struct ViewState<R> {
    resource: Option<String>,
    records: Vec<R>,
    status: StoreStatus,
}

impl<R> ViewState<R> {
    fn new() -> Self {
        Self {
            resource: None,
            records: Vec::new(),
            status: StoreStatus::idle(),
        }
    }
}

// ============================================================================
// RecordStore
// ============================================================================

pub struct RecordStore<D: Domain> {
    transport: Arc<dyn RecordTransport<D>>,
    policy: Arc<dyn FallbackPolicy<D::Record>>,
    events: Arc<EventEmitter<StoreEvent>>,
    fetch_timeout: Option<Duration>,
    cache: DocumentCache<Vec<D::Record>>,
    view: Mutex<ViewState<D::Record>>,
    retry: RetryHandle<D::Input, D::Patch>,
    guard: ConfirmGuard,
}

impl<D: Domain> RecordStore<D> {
    pub fn new(options: RecordStoreOptions<D>) -> Self {
        Self {
            transport: options.transport,
            policy: options.policy,
            events: options.events.unwrap_or_default(),
            fetch_timeout: options.fetch_timeout,
            cache: DocumentCache::new(),
            view: Mutex::new(ViewState::new()),
            retry: RetryHandle::new(),
            guard: ConfirmGuard::new(),
        }
    }

    // -----------------------------------------------------------------------
    // State getters
    // -----------------------------------------------------------------------

    /// Records currently on screen.
    pub fn records(&self) -> Vec<D::Record> {
        self.view.lock().records.clone()
    }

    /// Current status flags.
    pub fn status(&self) -> StoreStatus {
        self.view.lock().status.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.view.lock().status.is_loading()
    }

    /// Resource the store is currently viewing.
    pub fn current_resource(&self) -> Option<String> {
        self.view.lock().resource.clone()
    }

    /// The recorded pending operation, for inspection and logging.
    pub fn pending_op(&self) -> Option<PendingOp<D::Input, D::Patch>> {
        self.retry.current()
    }

    /// The store's cache.
    pub fn cache(&self) -> &DocumentCache<Vec<D::Record>> {
        &self.cache
    }

    // -----------------------------------------------------------------------
    // Fetch
    // -----------------------------------------------------------------------

    /// Load `resource`, serving the cache entry without a network call when
    /// one exists.
    pub async fn fetch(&self, resource: &str) {
        self.fetch_with(resource, None, false).await;
    }

    /// Load `resource`, passing raw file content for synthetic fallback.
    pub async fn fetch_with_source(&self, resource: &str, source: &str) {
        self.fetch_with(resource, Some(source), false).await;
    }

    /// Load `resource` from the network even when a cache entry exists.
    pub async fn refresh(&self, resource: &str) {
        self.fetch_with(resource, None, true).await;
    }

    async fn fetch_with(&self, resource: &str, source: Option<&str>, bypass_cache: bool) {
        let epoch = self.guard.begin(&fetch_key(resource));
        self.retry.record(PendingOp::Fetch {
            resource: resource.to_string(),
            source: source.map(|s| s.to_string()),
        });

        {
            let mut view = self.view.lock();
            self.enter_resource(&mut view, resource);
            view.status.begin_loading();
        }
        self.events.emit(&StoreEvent::FetchStarted {
            domain: D::NAME,
            resource: resource.to_string(),
        });

        // Cache-hit short-circuit: a present entry wins over the network.
        if !bypass_cache {
            if let Some(cached) = self.cache.get(resource) {
                let phase = {
                    let mut view = self.view.lock();
                    view.records = cached;
                    view.status.succeed();
                    view.status.phase
                };
                self.retry.clear();
                self.settled(resource, phase);
                return;
            }
        }

        let result = self.list_from_transport(resource).await;

        // A newer fetch, mutation, or reset superseded this attempt.
        if !self.guard.is_current(&fetch_key(resource), epoch) {
            tracing::debug!(domain = D::NAME, resource, "discarding stale fetch completion");
            return;
        }

        let phase = match result {
            Ok(records) => {
                self.cache.set(resource, records.clone());
                let mut view = self.view.lock();
                view.records = records;
                view.status.succeed();
                self.retry.clear();
                view.status.phase
            }
            Err(e) => self.settle_degraded(resource, source, &e),
        };
        self.settled(resource, phase);
    }

    async fn list_from_transport(
        &self,
        resource: &str,
    ) -> Result<Vec<D::Record>, TransportError> {
        match self.fetch_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, self.transport.list(resource))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(TransportError::timeout(format!(
                    "list {} for {resource}",
                    D::NAME
                ))),
            },
            None => self.transport.list(resource).await,
        }
    }

    /// Apply the domain's fallback policy after a failed fetch.
    fn settle_degraded(
        &self,
        resource: &str,
        source: Option<&str>,
        error: &TransportError,
    ) -> LoadPhase {
        let decision = self
            .policy
            .resolve(resource, self.cache.get(resource), source);

        match decision {
            FallbackDecision::Cached(records) => {
                tracing::warn!(domain = D::NAME, resource, error = %error, "serving cached data");
                let mut view = self.view.lock();
                view.records = records;
                view.status
                    .degrade_cached(format!("Showing cached data; fetch failed: {error}"));
                view.status.phase
            }
            FallbackDecision::Synthesized(records) => {
                tracing::warn!(domain = D::NAME, resource, error = %error, "serving synthesized fallback");
                // Cached as a normal fetch result, per the fallback contract.
                self.cache.set(resource, records.clone());
                let mut view = self.view.lock();
                view.records = records;
                view.status
                    .degrade_synthetic(format!("Showing fallback data; fetch failed: {error}"));
                view.status.phase
            }
            FallbackDecision::Exhausted => {
                tracing::warn!(domain = D::NAME, resource, error = %error, "fetch failed with no fallback");
                let exhausted = StoreError::FallbackExhausted {
                    resource: resource.to_string(),
                };
                let mut view = self.view.lock();
                view.records.clear();
                view.status.fail(format!("{exhausted}: {error}"));
                view.status.phase
            }
        }
    }

    // -----------------------------------------------------------------------
    // Optimistic mutations
    // -----------------------------------------------------------------------

    /// Create a record optimistically: a provisional record appears at once
    /// and is swapped for the server record (or removed) when the call
    /// settles.
    pub async fn create(&self, resource: &str, input: D::Input) {
        if let Err(e) = D::validate(&input) {
            self.view
                .lock()
                .status
                .set_error(StoreError::Validation(e).to_string());
            return;
        }

        self.retry.record(PendingOp::Create {
            resource: resource.to_string(),
            input: input.clone(),
        });

        let provisional = D::provisional(resource, &input);
        let temp = provisional.id().to_string();
        let epoch = self.guard.begin(&record_key(&temp));
        // An in-flight fetch must not clobber the optimistic insert.
        self.guard.begin(&fetch_key(resource));

        let compensation = {
            let mut view = self.view.lock();
            self.enter_resource(&mut view, resource);
            insert_provisional(&mut view.records, provisional)
        };
        self.mutated(resource, &temp);

        let result = self.transport.create(resource, &input).await;

        if !self.guard.is_current(&record_key(&temp), epoch) {
            tracing::debug!(domain = D::NAME, resource, id = %temp, "discarding stale create completion");
            if let Err(e) = &result {
                self.view.lock().status.set_error(e.to_string());
            }
            return;
        }

        match result {
            Ok(server_record) => {
                let confirmed_id = server_record.id().to_string();
                {
                    let mut view = self.view.lock();
                    if let Some(slot) = view.records.iter_mut().find(|r| r.id() == temp) {
                        *slot = server_record;
                    }
                    view.status.error = None;
                    self.cache.set(resource, view.records.clone());
                }
                self.retry.clear();
                self.mutated(resource, &confirmed_id);
            }
            Err(e) => {
                self.roll_back(resource, compensation, &e);
            }
        }
    }

    /// Update a record optimistically: the patch is visible at once and the
    /// captured pre-mutation record is restored verbatim on failure.
    pub async fn update(&self, id: &str, patch: D::Patch) {
        let Some(resource) = self.current_resource() else {
            return;
        };
        if is_temp_id(id) {
            self.view
                .lock()
                .status
                .set_error("Cannot modify an unconfirmed record".to_string());
            return;
        }

        self.retry.record(PendingOp::Update {
            resource: resource.clone(),
            id: id.to_string(),
            patch: patch.clone(),
        });

        let epoch = self.guard.begin(&record_key(id));
        self.guard.begin(&fetch_key(&resource));

        let compensation = {
            let mut view = self.view.lock();
            match patch_record(&mut view.records, id, |r| D::apply_patch(r, &patch)) {
                Some(comp) => comp,
                None => {
                    let unknown = StoreError::UnknownRecord { id: id.to_string() };
                    view.status.set_error(unknown.to_string());
                    return;
                }
            }
        };
        self.mutated(&resource, id);

        let result = self.transport.update(&resource, id, &patch).await;

        if !self.guard.is_current(&record_key(id), epoch) {
            tracing::debug!(domain = D::NAME, resource = %resource, id, "discarding stale update completion");
            if let Err(e) = &result {
                self.view.lock().status.set_error(e.to_string());
            }
            return;
        }

        match result {
            Ok(server_record) => {
                {
                    let mut view = self.view.lock();
                    // Reconcile with server truth, not the optimistic guess.
                    if let Some(slot) = view.records.iter_mut().find(|r| r.id() == id) {
                        *slot = server_record;
                    }
                    view.status.error = None;
                    self.cache.set(&resource, view.records.clone());
                }
                self.retry.clear();
                self.mutated(&resource, id);
            }
            Err(e) => {
                self.roll_back(&resource, compensation, &e);
            }
        }
    }

    /// Delete a record optimistically: it disappears at once and is
    /// re-inserted with all fields intact on failure.
    pub async fn delete(&self, id: &str) {
        let Some(resource) = self.current_resource() else {
            return;
        };
        if is_temp_id(id) {
            self.view
                .lock()
                .status
                .set_error("Cannot modify an unconfirmed record".to_string());
            return;
        }

        self.retry.record(PendingOp::Delete {
            resource: resource.clone(),
            id: id.to_string(),
        });

        let epoch = self.guard.begin(&record_key(id));
        self.guard.begin(&fetch_key(&resource));

        let compensation = {
            let mut view = self.view.lock();
            match remove_record(&mut view.records, id) {
                Some(comp) => comp,
                None => {
                    let unknown = StoreError::UnknownRecord { id: id.to_string() };
                    view.status.set_error(unknown.to_string());
                    return;
                }
            }
        };
        self.mutated(&resource, id);

        let result = self.transport.delete(&resource, id).await;

        if !self.guard.is_current(&record_key(id), epoch) {
            tracing::debug!(domain = D::NAME, resource = %resource, id, "discarding stale delete completion");
            if let Err(e) = &result {
                self.view.lock().status.set_error(e.to_string());
            }
            return;
        }

        match result {
            Ok(()) => {
                {
                    let mut view = self.view.lock();
                    view.status.error = None;
                    self.cache.set(&resource, view.records.clone());
                }
                self.retry.clear();
                self.mutated(&resource, id);
            }
            Err(e) => {
                self.roll_back(&resource, compensation, &e);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Retry / dismiss / reset
    // -----------------------------------------------------------------------

    /// Re-execute the recorded operation verbatim. No-op when nothing is
    /// recorded. Concurrent retries are the caller's responsibility to
    /// prevent (disable the affordance while one is in flight).
    pub async fn retry(&self) {
        let Some(op) = self.retry.current() else {
            return;
        };
        tracing::debug!(domain = D::NAME, op = op.label(), resource = op.resource(), "retrying");
        match op {
            PendingOp::Fetch { resource, source } => {
                // Bypass the cache: a fallback result may have been cached
                // and would short-circuit the retry.
                self.fetch_with(&resource, source.as_deref(), true).await;
            }
            PendingOp::Create { resource, input } => {
                self.create(&resource, input).await;
            }
            PendingOp::Update { id, patch, .. } => {
                self.update(&id, patch).await;
            }
            PendingOp::Delete { id, .. } => {
                self.delete(&id).await;
            }
        }
    }

    /// Dismiss the error banner without retrying.
    pub fn clear_error(&self) {
        let resource = {
            let mut view = self.view.lock();
            view.status.clear_error();
            view.resource.clone()
        };
        if let Some(resource) = resource {
            self.events.emit(&StoreEvent::ErrorCleared {
                domain: D::NAME,
                resource,
            });
        }
    }

    /// Drop the view back to `Idle`. The cache is left intact for return
    /// visits; in-flight completions become stale.
    pub fn reset(&self) {
        {
            let mut view = self.view.lock();
            view.resource = None;
            view.records.clear();
            view.status.reset();
        }
        self.retry.clear();
        self.guard.clear();
    }

    /// Drop every cache entry.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Point the view at `resource`, clearing state left over from another
    /// resource. Must be called with the view lock held.
    fn enter_resource(&self, view: &mut ViewState<D::Record>, resource: &str) {
        if view.resource.as_deref() != Some(resource) {
            view.resource = Some(resource.to_string());
            view.records.clear();
            view.status.reset();
        }
    }

    /// Apply a compensation after a failed confirming call.
    fn roll_back(&self, resource: &str, compensation: Compensation<D::Record>, error: &TransportError) {
        let id = compensation.record_id().to_string();
        tracing::warn!(domain = D::NAME, resource, id = %id, error = %error, "rolling back optimistic mutation");
        {
            let mut view = self.view.lock();
            compensation.apply(&mut view.records);
            view.status.set_error(error.to_string());
        }
        self.events.emit(&StoreEvent::MutationRolledBack {
            domain: D::NAME,
            resource: resource.to_string(),
            id,
        });
    }

    fn settled(&self, resource: &str, phase: LoadPhase) {
        self.events.emit(&StoreEvent::FetchSettled {
            domain: D::NAME,
            resource: resource.to_string(),
            phase,
        });
    }

    fn mutated(&self, resource: &str, id: &str) {
        self.events.emit(&StoreEvent::RecordMutated {
            domain: D::NAME,
            resource: resource.to_string(),
            id: id.to_string(),
        });
    }
}
