//! Persisted UI state — named keys, each holding one JSON blob.
//!
//! Only preferences go through this layer; cached domain data stays in
//! memory (losing it costs a refetch, not correctness). No versioning or
//! migration scheme — a blob that fails to parse is discarded.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::PersistError;

/// Storage keys. Each key holds an independent JSON blob.
pub mod keys {
    /// UI preferences ([`Preferences`](super::Preferences)).
    pub const PREFERENCES: &str = "scholia.preferences";
}

// ---------------------------------------------------------------------------
// PersistBackend
// ---------------------------------------------------------------------------

/// Host-provided key/blob storage (browser local storage, a dotfile, etc.).
///
/// All methods are synchronous; implementations are expected to be fast
/// (memory or a small local file), never a network hop.
pub trait PersistBackend: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn save(&self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// In-memory backend — the default for tests and for hosts without durable
/// storage. Contents vanish at teardown.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

/// UI preferences surviving across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Whether quality badges are shown. User-controlled; distinct from the
    /// error-driven hide flag on the quality store.
    #[serde(default = "default_true")]
    pub quality_badges_visible: bool,
    /// Whether the annotation side panel is open.
    #[serde(default = "default_true")]
    pub annotation_panel_visible: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            quality_badges_visible: true,
            annotation_panel_visible: true,
        }
    }
}

// ---------------------------------------------------------------------------
// PreferenceStore
// ---------------------------------------------------------------------------

/// Preferences bound to a [`PersistBackend`].
///
/// Loads once at construction; every update is written through best-effort.
/// A write failure keeps the in-memory value and logs — preferences are not
/// correctness-critical.
pub struct PreferenceStore {
    backend: Arc<dyn PersistBackend>,
    current: Mutex<Preferences>,
}

impl PreferenceStore {
    /// Load preferences from `backend`, falling back to defaults when the
    /// key is absent, unreadable, or holds a corrupt blob.
    pub fn load(backend: Arc<dyn PersistBackend>) -> Self {
        let current = match backend.load(keys::PREFERENCES) {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                tracing::warn!(
                    key = keys::PREFERENCES,
                    error = %e,
                    "discarding corrupt preference blob"
                );
                Preferences::default()
            }),
            Ok(None) => Preferences::default(),
            Err(e) => {
                tracing::warn!(key = keys::PREFERENCES, error = %e, "preference load failed");
                Preferences::default()
            }
        };
        Self {
            backend,
            current: Mutex::new(current),
        }
    }

    /// Current preferences snapshot.
    pub fn get(&self) -> Preferences {
        self.current.lock().clone()
    }

    /// Apply `mutate` to the preferences and write the result through.
    pub fn update(&self, mutate: impl FnOnce(&mut Preferences)) -> Preferences {
        let snapshot = {
            let mut prefs = self.current.lock();
            mutate(&mut prefs);
            prefs.clone()
        };
        // Serialization of a plain struct cannot fail; backend writes can.
        if let Ok(blob) = serde_json::to_string(&snapshot) {
            if let Err(e) = self.backend.save(keys::PREFERENCES, &blob) {
                tracing::warn!(key = keys::PREFERENCES, error = %e, "preference save failed");
            }
        }
        snapshot
    }

    /// Reset preferences to defaults and remove the persisted blob.
    pub fn reset(&self) {
        *self.current.lock() = Preferences::default();
        if let Err(e) = self.backend.remove(keys::PREFERENCES) {
            tracing::warn!(key = keys::PREFERENCES, error = %e, "preference remove failed");
        }
    }
}
