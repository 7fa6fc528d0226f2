//! Load retry with backoff on SDK initialization races.
//!
//! A rewarded load on a cold app start can race SDK initialization; the
//! SDK answers [`SutradharError::NotInitialized`] until it is up, and that
//! single transient case is retried with a fixed backoff. Every other load
//! failure ends the loop — no-fill is handled by format fallback, not by
//! hammering the network.

use std::time::Duration;

use tracing::warn;

use crate::error::Result;
use crate::telemetry;
use crate::types::AdFormat;

use super::provider::AdProvider;

/// Default load attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff between attempts while the SDK initialises.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// Configuration for load retry behaviour.
///
/// ```rust
/// # use sutradhar::LoadRetryConfig;
/// # use std::time::Duration;
/// let config = LoadRetryConfig::new()
///     .max_attempts(5)
///     .backoff(Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct LoadRetryConfig {
    /// Maximum number of load attempts (including the first). 1 = no
    /// retry. Default: 3.
    pub max_attempts: u32,
    /// Fixed delay between attempts when the SDK is still initialising.
    /// Default: 2s.
    pub backoff: Duration,
}

impl Default for LoadRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl LoadRetryConfig {
    /// Create a new config with the default budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the first).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the fixed backoff between attempts.
    pub fn backoff(mut self, delay: Duration) -> Self {
        self.backoff = delay;
        self
    }
}

/// Load an ad with retry, reporting whether it ended up ready.
///
/// Each attempt loads and then checks readiness, exiting early as soon as
/// the format is ready. Only [`SutradharError::NotInitialized`] (see
/// [`SutradharError::is_transient`]) earns another attempt after the
/// backoff; other errors propagate immediately, as does a transient error
/// on the final attempt. Exhausting the budget without ever being ready
/// resolves `Ok(false)`.
///
/// [`SutradharError::NotInitialized`]: crate::SutradharError::NotInitialized
/// [`SutradharError::is_transient`]: crate::SutradharError::is_transient
pub async fn load_until_ready(
    provider: &AdProvider,
    format: AdFormat,
    config: &LoadRetryConfig,
) -> Result<bool> {
    for attempt in 0..config.max_attempts {
        match provider.load(format).await {
            Ok(()) => {
                if provider.is_ready(format).await {
                    return Ok(true);
                }
            }
            Err(e) if e.is_transient() => {
                metrics::counter!(telemetry::AD_LOAD_RETRIES_TOTAL,
                    "format" => format.as_str(),
                )
                .increment(1);
                if attempt + 1 >= config.max_attempts {
                    return Err(e);
                }
                warn!(
                    format = %format,
                    attempt = attempt + 1,
                    max_attempts = config.max_attempts,
                    delay_ms = config.backoff.as_millis() as u64,
                    error = %e,
                    "ad SDK not initialized, retrying load"
                );
                tokio::time::sleep(config.backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}
