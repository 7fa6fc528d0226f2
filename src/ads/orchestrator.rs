//! Ad presentation protocols.
//!
//! Two flows own every ad moment in the app:
//!
//! - **Reward gate** ([`AdOrchestrator::reward_gate`]) — a feature behind
//!   an ad. Rewarded first, with a load retry while the SDK initialises;
//!   interstitial as fallback; and an explicit escape token when no
//!   inventory exists, so a user on an ad-free platform is never locked
//!   out.
//! - **Post-action ad** ([`AdOrchestrator::post_action_ad`]) — a detached
//!   interstitial a few seconds after a completed action. Strictly
//!   best-effort; the action's result never waits on it.
//!
//! # Gate flow
//!
//! ```text
//! reward_gate()
//!     │ no capability ───────────────► Unavailable { NotSupported }
//!     ▼
//! rewarded ready? ─ no ─► load w/ retry ─► settle ─► recheck
//!     │ yes                                  │ still not ready
//!     ▼                                      ▼
//! show_rewarded()                   interstitial ready? (1 load, settle)
//!     │ earned        │ closed early        │ yes          │ no
//!     ▼               ▼                     ▼              ▼
//! Granted(Earned)   NotEarned    show ─► Granted(Fallback)   Unavailable { NoFill }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::telemetry;
use crate::types::{AdFormat, EscapeHatch, GateAttempt, GateOutcome, UnavailableReason};

use super::provider::{AdProvider, DEFAULT_SHOW_SETTLE};
use super::retry::{LoadRetryConfig, load_until_ready};

/// Default wait between a retried load and the readiness re-check.
pub const DEFAULT_READY_RECHECK: Duration = Duration::from_millis(1500);

/// Default delay before a post-action ad fires.
pub const DEFAULT_POST_ACTION_DELAY: Duration = Duration::from_secs(4);

/// Default wait between a post-action load and its readiness re-check.
pub const DEFAULT_POST_ACTION_SETTLE: Duration = Duration::from_millis(800);

/// Default wall-clock bound on a whole reward gate run.
pub const DEFAULT_GATE_DEADLINE: Duration = Duration::from_secs(15);

/// Named pause points in the ad protocols.
///
/// All waits are tunable; the defaults mirror the production app.
///
/// ```rust
/// # use sutradhar::AdTimings;
/// # use std::time::Duration;
/// let timings = AdTimings::new()
///     .post_action_delay(Duration::from_secs(2))
///     .gate_deadline(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct AdTimings {
    /// Wait after a just-in-time load before a show attempt. Lives on
    /// [`AdProvider`]; the gateway builder wires it through. Default: 1s.
    pub show_settle: Duration,
    /// Wait between a load attempt and the readiness re-check inside the
    /// gate. Default: 1.5s.
    pub ready_recheck: Duration,
    /// Delay before a post-action ad fires. Default: 4s.
    pub post_action_delay: Duration,
    /// Wait between a post-action load and its re-check. Default: 800ms.
    pub post_action_settle: Duration,
    /// Wall-clock bound on a whole reward gate run. Default: 15s.
    pub gate_deadline: Duration,
}

impl Default for AdTimings {
    fn default() -> Self {
        Self {
            show_settle: DEFAULT_SHOW_SETTLE,
            ready_recheck: DEFAULT_READY_RECHECK,
            post_action_delay: DEFAULT_POST_ACTION_DELAY,
            post_action_settle: DEFAULT_POST_ACTION_SETTLE,
            gate_deadline: DEFAULT_GATE_DEADLINE,
        }
    }
}

impl AdTimings {
    /// Create timings with the production defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wait after a just-in-time load before a show attempt.
    pub fn show_settle(mut self, delay: Duration) -> Self {
        self.show_settle = delay;
        self
    }

    /// Set the wait between a gate load and its readiness re-check.
    pub fn ready_recheck(mut self, delay: Duration) -> Self {
        self.ready_recheck = delay;
        self
    }

    /// Set the delay before a post-action ad fires.
    pub fn post_action_delay(mut self, delay: Duration) -> Self {
        self.post_action_delay = delay;
        self
    }

    /// Set the wait between a post-action load and its re-check.
    pub fn post_action_settle(mut self, delay: Duration) -> Self {
        self.post_action_settle = delay;
        self
    }

    /// Set the wall-clock bound on a reward gate run.
    pub fn gate_deadline(mut self, deadline: Duration) -> Self {
        self.gate_deadline = deadline;
        self
    }
}

/// Runs the reward gate and post-action protocols over an [`AdProvider`].
pub struct AdOrchestrator {
    provider: Arc<AdProvider>,
    retry: LoadRetryConfig,
    timings: AdTimings,
}

impl AdOrchestrator {
    /// Orchestrator with default retry budget and timings.
    pub fn new(provider: Arc<AdProvider>) -> Self {
        Self {
            provider,
            retry: LoadRetryConfig::default(),
            timings: AdTimings::default(),
        }
    }

    /// Override the load retry budget for the rewarded leg.
    pub fn load_retry(mut self, config: LoadRetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Override the protocol timings.
    pub fn timings(mut self, timings: AdTimings) -> Self {
        self.timings = timings;
        self
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<AdProvider> {
        &self.provider
    }

    /// Warm the rewarded slot; call when the gate UI opens. Best-effort.
    pub async fn prepare(&self) {
        self.provider.preload(AdFormat::Rewarded).await;
    }

    /// Run the reward gate.
    ///
    /// Resolves once an ad has been shown or proven unshowable; it never
    /// errors. A [`GateAttempt::Unavailable`] result carries the one-shot
    /// escape token for the "continue anyway" action.
    #[instrument(skip(self))]
    pub async fn reward_gate(&self) -> GateAttempt {
        if !self.provider.has_capability() {
            debug!("no ad capability, gate unavailable");
            return self.unavailable(UnavailableReason::NotSupported);
        }

        match tokio::time::timeout(self.timings.gate_deadline, self.run_gate()).await {
            Ok(attempt) => attempt,
            Err(_) => {
                warn!(
                    deadline_ms = self.timings.gate_deadline.as_millis() as u64,
                    "reward gate deadline elapsed"
                );
                // The cancelled leg may still hold a claim on a load slot.
                self.provider.clear_loading();
                self.unavailable(UnavailableReason::DeadlineExceeded)
            }
        }
    }

    async fn run_gate(&self) -> GateAttempt {
        // Rewarded leg: full retry budget while the SDK initialises.
        if self.ensure_ready(AdFormat::Rewarded, &self.retry).await {
            let reward = self.provider.show_rewarded().await;
            if reward.earned_reward {
                self.spawn_preload(AdFormat::Rewarded);
                record_gate("earned");
                return GateAttempt::Granted(GateOutcome::EarnedReward {
                    amount: reward.amount,
                });
            }
            record_gate("not_earned");
            return GateAttempt::NotEarned;
        }

        // Fallback leg: interstitial, single load attempt.
        if self
            .ensure_ready(AdFormat::Interstitial, &LoadRetryConfig::disabled())
            .await
        {
            match self.provider.show(AdFormat::Interstitial).await {
                Ok(()) => {
                    self.spawn_preload(AdFormat::Interstitial);
                    record_gate("fallback");
                    return GateAttempt::Granted(GateOutcome::FallbackShown);
                }
                Err(e) => {
                    warn!(error = %e, "fallback interstitial failed to show");
                    return self.unavailable(UnavailableReason::Failed(e));
                }
            }
        }

        self.unavailable(UnavailableReason::NoFill)
    }

    /// Check readiness; when the first answer is no, run the load budget.
    /// A load that was acknowledged without confirmed fill gets one more
    /// chance after the recheck delay, since fill can lag the
    /// acknowledgement. Load errors degrade to "not ready" the same way.
    async fn ensure_ready(&self, format: AdFormat, retry: &LoadRetryConfig) -> bool {
        if self.provider.is_ready(format).await {
            return true;
        }
        match load_until_ready(&self.provider, format, retry).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => {
                debug!(format = %format, error = %e, "load failed while filling the gate");
            }
        }
        tokio::time::sleep(self.timings.ready_recheck).await;
        self.provider.is_ready(format).await
    }

    fn unavailable(&self, reason: UnavailableReason) -> GateAttempt {
        record_gate(reason.as_str());
        GateAttempt::Unavailable {
            reason,
            escape: EscapeHatch::new(),
        }
    }

    /// Schedule an interstitial after a completed action.
    ///
    /// Detached: the caller's result never waits on the ad. The returned
    /// handle resolves `true` iff an ad was shown and is safe to drop. All
    /// failures inside the task are logged and swallowed.
    pub fn post_action_ad(&self, delay: Option<Duration>) -> JoinHandle<bool> {
        self.post_action_ad_with(delay, || {})
    }

    /// [`post_action_ad`](Self::post_action_ad) with a callback invoked
    /// right after the ad is presented (the app uses it to stamp the
    /// timer-ad schedule).
    pub fn post_action_ad_with(
        &self,
        delay: Option<Duration>,
        on_shown: impl FnOnce() + Send + 'static,
    ) -> JoinHandle<bool> {
        let provider = Arc::clone(&self.provider);
        let delay = delay.unwrap_or(self.timings.post_action_delay);
        let settle = self.timings.post_action_settle;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !provider.has_capability() {
                return false;
            }

            let mut ready = provider.is_ready(AdFormat::Interstitial).await;
            if !ready {
                if let Err(e) = provider.load(AdFormat::Interstitial).await {
                    debug!(error = %e, "post-action load failed");
                }
                tokio::time::sleep(settle).await;
                ready = provider.is_ready(AdFormat::Interstitial).await;
            }

            if !ready {
                debug!("no interstitial ready, skipping post-action ad");
                record_post_action("skipped");
                return false;
            }

            match provider.show(AdFormat::Interstitial).await {
                Ok(()) => {
                    on_shown();
                    provider.preload(AdFormat::Interstitial).await;
                    record_post_action("shown");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "post-action interstitial failed");
                    record_post_action("failed");
                    false
                }
            }
        })
    }

    fn spawn_preload(&self, format: AdFormat) {
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            provider.preload(format).await;
        });
    }
}

fn record_gate(outcome: &'static str) {
    metrics::counter!(telemetry::GATE_OUTCOMES_TOTAL, "outcome" => outcome).increment(1);
}

fn record_post_action(status: &'static str) {
    metrics::counter!(telemetry::POST_ACTION_ADS_TOTAL, "status" => status).increment(1);
}
