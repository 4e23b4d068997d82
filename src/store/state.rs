//! Load-phase state machine and the readable flags derived from it.
//!
//! One machine shape shared by every domain:
//!
//! ```text
//! Idle → Loading → { Success | CachedFallback | SyntheticFallback | HardError }
//! ```
//!
//! `HardError` and the fallback phases return to `Loading` via explicit
//! retry. Any settled phase returns to `Idle` via resource switch or
//! [`StoreStatus::reset`]. Dismissal (`clear_error`) drops the error flag and
//! the fallback banners; data already on screen stays on screen.

/// Where one resource's view is in its load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// No resource loaded, or state was reset.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Server data is on screen.
    Success,
    /// Fetch failed; the cache entry is on screen.
    CachedFallback,
    /// Fetch failed; locally synthesized data is on screen.
    SyntheticFallback,
    /// Fetch failed and nothing can be shown.
    HardError,
}

impl LoadPhase {
    /// Whether the phase shows degraded (non-server) data.
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::CachedFallback | Self::SyntheticFallback)
    }

    /// Whether a fetch has settled, successfully or not.
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Idle | Self::Loading)
    }
}

/// The flags a presentation layer binds to. Set by the store pipeline,
/// cleared by successful fetch, explicit dismissal, or reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub phase: LoadPhase,
    /// Human-readable failure or degradation banner. `None` when nothing is
    /// wrong.
    pub error: Option<String>,
    /// Data on screen came from the cache after a failed fetch.
    pub using_cached_data: bool,
    /// Data on screen was synthesized locally after a failed fetch.
    pub using_fallback: bool,
}

impl StoreStatus {
    pub fn idle() -> Self {
        Self {
            phase: LoadPhase::Idle,
            error: None,
            using_cached_data: false,
            using_fallback: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    /// Enter `Loading`. Banners from a previous degraded state are kept
    /// until the fetch settles so the UI does not flicker.
    pub fn begin_loading(&mut self) {
        self.phase = LoadPhase::Loading;
    }

    /// Settle on server data. Clears every flag.
    pub fn succeed(&mut self) {
        self.phase = LoadPhase::Success;
        self.error = None;
        self.using_cached_data = false;
        self.using_fallback = false;
    }

    /// Settle on cached data after a failed fetch.
    pub fn degrade_cached(&mut self, banner: String) {
        self.phase = LoadPhase::CachedFallback;
        self.error = Some(banner);
        self.using_cached_data = true;
        self.using_fallback = false;
    }

    /// Settle on synthesized data after a failed fetch.
    pub fn degrade_synthetic(&mut self, banner: String) {
        self.phase = LoadPhase::SyntheticFallback;
        self.error = Some(banner);
        self.using_cached_data = false;
        self.using_fallback = true;
    }

    /// Settle with nothing to show.
    pub fn fail(&mut self, message: String) {
        self.phase = LoadPhase::HardError;
        self.error = Some(message);
        self.using_cached_data = false;
        self.using_fallback = false;
    }

    /// Record a mutation failure without changing what is on screen.
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    /// Explicit dismissal. Drops the error flag and fallback banners.
    /// A `HardError` (no data) returns to `Idle`; a degraded phase keeps its
    /// data on screen and reads as `Success` from here on.
    pub fn clear_error(&mut self) {
        self.error = None;
        self.using_cached_data = false;
        self.using_fallback = false;
        match self.phase {
            LoadPhase::HardError => self.phase = LoadPhase::Idle,
            LoadPhase::CachedFallback | LoadPhase::SyntheticFallback => {
                self.phase = LoadPhase::Success;
            }
            _ => {}
        }
    }

    /// Resource switch or teardown: back to `Idle`, all flags dropped.
    pub fn reset(&mut self) {
        *self = Self::idle();
    }
}

impl Default for StoreStatus {
    fn default() -> Self {
        Self::idle()
    }
}
