//! Uniform ad interface over an optional native capability.
//!
//! [`AdProvider`] wraps `Option<Arc<dyn AdCapability>>` and owns the
//! per-format loaded/loading flags. Capability absence (web builds, SDK
//! variants missing a method) degrades every operation to a no-op instead
//! of an error, so UI flows stay identical across platforms.
//!
//! # State discipline
//!
//! Full-screen formats are consumed by presentation: `show` clears `loaded`
//! whether the SDK succeeded or failed, so a stale flag can never mask an
//! expired ad. `loading` guards against concurrent duplicate loads. The
//! flags live behind a plain mutex that is taken and released around state
//! transitions, never held across an await.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::error::{Result, SutradharError};
use crate::telemetry;
use crate::types::{AdFormat, RewardOutcome};

use super::capability::AdCapability;

/// Delay between a load issued inside `show` and the show itself.
pub const DEFAULT_SHOW_SETTLE: Duration = Duration::from_secs(1);

/// Per-format load lifecycle flags.
#[derive(Debug, Clone, Copy, Default)]
struct AdState {
    loaded: bool,
    loading: bool,
}

/// Uniform interface over a possibly-absent native ad SDK.
pub struct AdProvider {
    capability: Option<Arc<dyn AdCapability>>,
    states: Mutex<[AdState; 4]>,
    show_settle: Duration,
}

impl AdProvider {
    /// Provider backed by a native capability.
    pub fn new(capability: Arc<dyn AdCapability>) -> Self {
        Self {
            capability: Some(capability),
            states: Mutex::new([AdState::default(); 4]),
            show_settle: DEFAULT_SHOW_SETTLE,
        }
    }

    /// Provider for platforms with no ad SDK. Every operation is a no-op
    /// and readiness is always `false`.
    pub fn unavailable() -> Self {
        Self {
            capability: None,
            states: Mutex::new([AdState::default(); 4]),
            show_settle: DEFAULT_SHOW_SETTLE,
        }
    }

    /// Override the settle delay between a load issued inside `show` and
    /// the show itself.
    pub fn show_settle(mut self, delay: Duration) -> Self {
        self.show_settle = delay;
        self
    }

    /// Whether a native capability is present.
    pub fn has_capability(&self) -> bool {
        self.capability.is_some()
    }

    /// Capability name, for logs.
    pub fn capability_name(&self) -> &str {
        self.capability.as_ref().map_or("none", |c| c.name())
    }

    /// Whether `format` is currently marked loaded.
    pub fn is_loaded(&self, format: AdFormat) -> bool {
        self.state(format).loaded
    }

    /// Whether a load for `format` is in flight.
    pub fn is_loading(&self, format: AdFormat) -> bool {
        self.state(format).loading
    }

    /// Request an ad of the given format.
    ///
    /// Idempotent: returns immediately when an ad is already loaded or a
    /// load is in flight, so each format sees at most one native load at a
    /// time. Capability absence is a successful no-op. Other failures clear
    /// the in-flight flag and propagate.
    #[instrument(skip(self), fields(capability = self.capability_name()))]
    pub async fn load(&self, format: AdFormat) -> Result<()> {
        let Some(capability) = &self.capability else {
            return Ok(());
        };

        // Claim the load slot before the first await.
        {
            let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
            let state = &mut states[format.index()];
            if state.loaded || state.loading {
                return Ok(());
            }
            state.loading = true;
        }

        match capability.load(format).await {
            Ok(()) => {
                self.update_state(format, |s| {
                    s.loaded = true;
                    s.loading = false;
                });
                record_load(format, true);
                Ok(())
            }
            Err(SutradharError::CapabilityUnavailable) => {
                self.update_state(format, |s| s.loading = false);
                debug!(format = %format, "load skipped, capability unavailable");
                Ok(())
            }
            Err(e) => {
                self.update_state(format, |s| s.loading = false);
                record_load(format, false);
                warn!(format = %format, error = %e, "ad load failed");
                Err(e)
            }
        }
    }

    /// Whether an ad of the given format is ready to present.
    ///
    /// Never errors: capability absence and query failures read as `false`.
    /// The answer is written back to the `loaded` flag, so SDK-side expiry
    /// is observed.
    pub async fn is_ready(&self, format: AdFormat) -> bool {
        let Some(capability) = &self.capability else {
            return false;
        };
        let ready = match capability.is_ready(format).await {
            Ok(ready) => ready,
            Err(SutradharError::CapabilityUnavailable) => false,
            Err(e) => {
                debug!(format = %format, error = %e, "readiness query failed");
                false
            }
        };
        self.update_state(format, |s| s.loaded = ready);
        ready
    }

    /// Present an ad of the given format.
    ///
    /// When nothing is loaded, makes one load attempt and waits out the
    /// settle delay first; if that load fails the show is silently skipped.
    /// Presentation consumes the ad: `loaded` is cleared on success and on
    /// failure alike, and a failed native show propagates.
    #[instrument(skip(self), fields(capability = self.capability_name()))]
    pub async fn show(&self, format: AdFormat) -> Result<()> {
        let Some(capability) = &self.capability else {
            return Ok(());
        };

        if !self.is_loaded(format) {
            if self.load(format).await.is_err() {
                return Ok(());
            }
            tokio::time::sleep(self.show_settle).await;
        }

        let outcome = capability.show(format).await;
        self.update_state(format, |s| s.loaded = false);
        match outcome {
            Ok(()) => {
                record_show(format, true);
                Ok(())
            }
            Err(SutradharError::CapabilityUnavailable) => Ok(()),
            Err(e) => {
                record_show(format, false);
                warn!(format = %format, error = %e, "ad show failed");
                Err(e)
            }
        }
    }

    /// Present a rewarded ad and report the reward outcome.
    ///
    /// Infallible: capability absence and every SDK failure resolve to
    /// "not earned". The rewarded slot is consumed either way.
    #[instrument(skip(self), fields(capability = self.capability_name()))]
    pub async fn show_rewarded(&self) -> RewardOutcome {
        let Some(capability) = &self.capability else {
            return RewardOutcome::not_earned();
        };
        let outcome = capability.show_rewarded().await;
        self.update_state(AdFormat::Rewarded, |s| s.loaded = false);
        match outcome {
            Ok(reward) => {
                record_show(AdFormat::Rewarded, true);
                reward
            }
            Err(e) => {
                record_show(AdFormat::Rewarded, false);
                warn!(error = %e, "rewarded show failed, treating as not earned");
                RewardOutcome::not_earned()
            }
        }
    }

    /// Best-effort background load, used to warm the next ad after one is
    /// consumed. Failures are logged at debug and swallowed.
    pub async fn preload(&self, format: AdFormat) {
        if let Err(e) = self.load(format).await {
            debug!(format = %format, error = %e, "preload failed");
        }
    }

    /// Hide a persistent surface (banner/native). Absence is a no-op.
    pub async fn hide(&self, format: AdFormat) -> Result<()> {
        let Some(capability) = &self.capability else {
            return Ok(());
        };
        match capability.hide(format).await {
            Err(SutradharError::CapabilityUnavailable) => Ok(()),
            other => other,
        }
    }

    /// Destroy a persistent surface (banner/native) and clear its flags.
    pub async fn remove(&self, format: AdFormat) -> Result<()> {
        let Some(capability) = &self.capability else {
            return Ok(());
        };
        let outcome = match capability.remove(format).await {
            Err(SutradharError::CapabilityUnavailable) => Ok(()),
            other => other,
        };
        self.update_state(format, |s| *s = AdState::default());
        outcome
    }

    /// Clear in-flight flags. A cancelled protocol run (gate deadline) can
    /// abandon a claimed load slot; this releases it.
    pub(crate) fn clear_loading(&self) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        for state in states.iter_mut() {
            state.loading = false;
        }
    }

    fn state(&self, format: AdFormat) -> AdState {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)[format.index()]
    }

    fn update_state(&self, format: AdFormat, f: impl FnOnce(&mut AdState)) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut states[format.index()]);
    }
}

fn record_load(format: AdFormat, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::AD_LOADS_TOTAL,
        "format" => format.as_str(),
        "status" => status,
    )
    .increment(1);
}

fn record_show(format: AdFormat, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::AD_SHOWS_TOTAL,
        "format" => format.as_str(),
        "status" => status,
    )
    .increment(1);
}
