use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

/// Classification of transport failures.
///
/// Drives retry affordances: `Network` and `Timeout` failures are worth
/// retrying verbatim, `Http` failures carry the status for the caller to
/// decide, `Validation` failures will not succeed on retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Request could not complete (DNS, connection reset, offline).
    Network,
    /// Backend returned a non-success HTTP status.
    Http(u16),
    /// In-flight call abandoned after its deadline elapsed.
    Timeout,
    /// Backend rejected the payload.
    Validation,
}

/// Failure at the remote-fetch boundary.
///
/// Carries the HTTP status or transport failure reason. Never escapes to the
/// presentation layer — stores translate it into state flags.
#[derive(Debug, Clone)]
pub struct TransportError {
    pub message: String,
    pub kind: TransportErrorKind,
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: TransportErrorKind::Network,
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: TransportErrorKind::Http(status),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: TransportErrorKind::Timeout,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: TransportErrorKind::Validation,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TransportErrorKind::Http(status) => {
                write!(f, "HTTP {status}: {}", self.message)
            }
            TransportErrorKind::Timeout => write!(f, "Request timed out: {}", self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A field-level input rejection. Not deeply modeled — the backend owns real
/// validation; this covers client-side rejects (empty required field, etc.).
#[derive(Debug, Clone, Error)]
#[error(r#"Validation failed at "{path}": {message}"#)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Failures inside a domain store's fetch/mutate pipeline.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Fetch failed and no cache entry or synthesizable fallback exists.
    #[error("No data available for \"{resource}\": fetch failed and no fallback exists")]
    FallbackExhausted { resource: String },

    #[error("Unknown record: {id}")]
    UnknownRecord { id: String },
}

// ---------------------------------------------------------------------------
// PersistError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Persist backend failed for key \"{key}\": {message}")]
    Backend { key: String, message: String },

    #[error("Corrupt blob under key \"{key}\"")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// SchedulerError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    #[error("RefreshScheduler is disposed")]
    Disposed,

    #[error("Coalesced refresh was dropped before completing")]
    Dropped,
}

// ---------------------------------------------------------------------------
// ScholiaError — top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScholiaError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias — the default error type is `ScholiaError`.
pub type Result<T, E = ScholiaError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
