//! RefreshScheduler — coalesce/cooldown layer over store refreshes.
//!
//! UI surfaces fire refresh events far faster than the backend should see
//! them (typing, scrolling, editor focus churn). Requests for one key
//! coalesce: while a refresh runs or its cooldown is active, callers queue
//! and are all served by one follow-up refresh.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::SchedulerError;

// ============================================================================
// RefreshScheduler
// ============================================================================

pub struct RefreshScheduler {
    cooldown_ms: u64,
    slots: Arc<Mutex<HashMap<String, Arc<Mutex<Slot>>>>>,
    disposed: Arc<AtomicBool>,
}

/// Per-key scheduling state.
struct Slot {
    running: bool,
    cooldown_active: bool,
    /// Queued waiters; all are resolved by the next refresh cycle.
    queued: Vec<oneshot::Sender<Result<(), SchedulerError>>>,
}

impl Slot {
    fn new() -> Self {
        Self {
            running: false,
            cooldown_active: false,
            queued: Vec::new(),
        }
    }
}

/// What the caller should do after checking the slot.
enum SlotAction {
    /// Slot idle: run the refresh now.
    Run,
    /// Slot busy or cooling down: await this receiver.
    Wait(oneshot::Receiver<Result<(), SchedulerError>>),
}

type RefreshFn = Arc<
    dyn Fn() -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> + Send + Sync,
>;

impl RefreshScheduler {
    /// `cooldown_ms` is the quiet period after each refresh (default 1000).
    pub fn new(cooldown_ms: Option<u64>) -> Self {
        Self {
            cooldown_ms: cooldown_ms.unwrap_or(1000),
            slots: Arc::new(Mutex::new(HashMap::new())),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request a refresh for `key`.
    ///
    /// Runs `refresh` immediately when the slot is idle; otherwise waits for
    /// the coalesced follow-up cycle that covers this request.
    pub async fn request<F, Fut>(&self, key: &str, refresh: F) -> Result<(), SchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(SchedulerError::Disposed);
        }

        let (slot_arc, action) = self.check_slot(key);

        match action {
            SlotAction::Wait(rx) => {
                return rx.await.map_err(|_| SchedulerError::Dropped)?;
            }
            SlotAction::Run => {}
        }

        // Run with no lock held.
        refresh().await;

        // Collect waiters that queued while we ran, then enter cooldown.
        let queued = {
            let mut slot = slot_arc.lock();
            slot.running = false;
            slot.cooldown_active = true;
            slot.queued.drain(..).collect::<Vec<_>>()
        };

        let make_future: RefreshFn = Arc::new(move || Box::pin(refresh()));
        self.spawn_cooldown(slot_arc, queued, make_future);

        Ok(())
    }

    /// Dispose the scheduler: reject queued waiters, refuse new requests.
    /// Cooldown tasks notice the flag and stop without running follow-ups.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);

        let mut slots = self.slots.lock();
        for (_, slot_arc) in slots.drain() {
            let mut slot = slot_arc.lock();
            for sender in slot.queued.drain(..) {
                let _ = sender.send(Err(SchedulerError::Disposed));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Get or create the slot for `key` and decide run-or-wait. Returns with
    /// no guard held so the caller can safely `.await`.
    fn check_slot(&self, key: &str) -> (Arc<Mutex<Slot>>, SlotAction) {
        let slot_arc = {
            let mut slots = self.slots.lock();
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Slot::new())))
                .clone()
        };

        let action = {
            let mut slot = slot_arc.lock();
            if slot.running || slot.cooldown_active {
                let (tx, rx) = oneshot::channel();
                slot.queued.push(tx);
                SlotAction::Wait(rx)
            } else {
                slot.running = true;
                SlotAction::Run
            }
        };

        (slot_arc, action)
    }

    /// After a refresh cycle: sleep out the cooldown, then serve every
    /// queued waiter with one follow-up refresh. Repeats while new waiters
    /// keep arriving during follow-ups.
    fn spawn_cooldown(
        &self,
        slot_arc: Arc<Mutex<Slot>>,
        initial_waiters: Vec<oneshot::Sender<Result<(), SchedulerError>>>,
        make_future: RefreshFn,
    ) {
        let cooldown_ms = self.cooldown_ms;
        let disposed = self.disposed.clone();

        tokio::spawn(async move {
            let mut carried = initial_waiters;

            loop {
                tokio::time::sleep(tokio::time::Duration::from_millis(cooldown_ms)).await;

                let cooldown_arrivals = {
                    let mut slot = slot_arc.lock();
                    slot.cooldown_active = false;
                    slot.queued.drain(..).collect::<Vec<_>>()
                };

                let mut waiters = std::mem::take(&mut carried);
                waiters.extend(cooldown_arrivals);

                if waiters.is_empty() {
                    break;
                }

                if disposed.load(Ordering::SeqCst) {
                    for sender in waiters {
                        let _ = sender.send(Err(SchedulerError::Disposed));
                    }
                    break;
                }

                {
                    let mut slot = slot_arc.lock();
                    slot.running = true;
                }

                make_future().await;

                let during_run = {
                    let mut slot = slot_arc.lock();
                    slot.running = false;
                    slot.cooldown_active = true;
                    slot.queued.drain(..).collect::<Vec<_>>()
                };

                for sender in waiters {
                    let _ = sender.send(Ok(()));
                }

                if during_run.is_empty() {
                    let mut slot = slot_arc.lock();
                    slot.cooldown_active = false;
                    break;
                }
                carried = during_run;
                // Another cooldown cycle begins.
            }
        });
    }
}
