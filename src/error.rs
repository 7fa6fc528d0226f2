//! Sutradhar error types

use crate::types::AdFormat;

/// Sutradhar error types
#[derive(Debug, thiserror::Error)]
pub enum SutradharError {
    // Ad capability errors
    /// The native ad capability (or one of its operations) is absent on this
    /// platform. [`AdProvider`](crate::ads::AdProvider) absorbs this variant:
    /// callers see no-ops and `false` readiness, never the error itself.
    #[error("ad capability not available on this platform")]
    CapabilityUnavailable,

    /// The SDK has not finished initialising. The one transient variant:
    /// load retries back off and try again on this and nothing else.
    #[error("ad SDK not initialized yet")]
    NotInitialized,

    #[error("failed to load {format} ad: {message}")]
    LoadFailed { format: AdFormat, message: String },

    #[error("failed to show {format} ad: {message}")]
    ShowFailed { format: AdFormat, message: String },

    // Reading backend errors
    #[error("reading backend error: {0}")]
    Backend(String),

    #[error("no reading backend configured")]
    NoBackend,

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Persistence errors — absorbed by the cache and the timer schedule
    // (logged and counted, never surfaced to callers).
    #[error("storage error: {0}")]
    Storage(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SutradharError {
    /// Whether this error is worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, SutradharError::NotInitialized)
    }

    /// Bucket this error for user-facing gate messaging.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            SutradharError::CapabilityUnavailable | SutradharError::NotInitialized => {
                FailureKind::Unavailable
            }
            SutradharError::LoadFailed { .. } => FailureKind::Load,
            _ => FailureKind::Other,
        }
    }
}

/// Coarse failure classification for choosing user-facing copy.
///
/// The gate UI only distinguishes "ads aren't available right now" from
/// "something went wrong, try again"; this mapping replaces matching on
/// error message substrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The SDK, the format, or the inventory is unavailable.
    Unavailable,
    /// An ad failed to load.
    Load,
    /// Anything else (show failures, backend trouble).
    Other,
}

/// Result type alias for Sutradhar operations
pub type Result<T> = std::result::Result<T, SutradharError>;
