//! Reward gate outcome types.

use serde::{Deserialize, Serialize};

use crate::error::SutradharError;

/// Result of a rewarded ad presentation.
///
/// Not earning the reward is data, not an error: the SDK resolves normally
/// when the user closes the ad early, and the gate treats that as a
/// retryable "watch the full ad" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardOutcome {
    /// Whether the user watched enough of the ad to earn the reward.
    pub earned_reward: bool,
    /// Reward amount reported by the SDK, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
}

impl RewardOutcome {
    /// The outcome every failure path resolves to: nothing earned.
    pub fn not_earned() -> Self {
        Self {
            earned_reward: false,
            amount: None,
        }
    }
}

/// How the reward gate granted access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The user watched a rewarded ad to completion.
    EarnedReward { amount: Option<u32> },
    /// Rewarded inventory was unavailable; an interstitial was shown
    /// and dismissed instead.
    FallbackShown,
    /// The user took the escape action after ads proved unavailable.
    ContinuedWithoutAd,
}

/// Result of a single reward gate run.
///
/// Never an error: every failure mode resolves to a variant the caller can
/// present.
#[derive(Debug)]
pub enum GateAttempt {
    /// Access granted; the gated feature may proceed.
    Granted(GateOutcome),
    /// A rewarded ad played but the user closed it early. The gate may be
    /// re-run ("please watch the full ad").
    NotEarned,
    /// No ad could be shown. The escape token lets the caller offer
    /// "continue anyway" so nobody is locked out of the feature.
    Unavailable {
        reason: UnavailableReason,
        escape: EscapeHatch,
    },
}

impl GateAttempt {
    /// Whether this attempt granted access.
    pub fn is_granted(&self) -> bool {
        matches!(self, GateAttempt::Granted(_))
    }
}

/// Why the gate could not show any ad.
#[derive(Debug)]
pub enum UnavailableReason {
    /// No native ad capability on this platform (e.g. web).
    NotSupported,
    /// Loads were attempted but no format became ready.
    NoFill,
    /// The gate deadline elapsed before any ad could be shown.
    DeadlineExceeded,
    /// An ad was ready but failed during presentation.
    Failed(SutradharError),
}

impl UnavailableReason {
    /// Metric label value for this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableReason::NotSupported => "not_supported",
            UnavailableReason::NoFill => "no_fill",
            UnavailableReason::DeadlineExceeded => "deadline_exceeded",
            UnavailableReason::Failed(_) => "failed",
        }
    }
}

/// One-shot token for the "continue anyway" escape action.
///
/// Consuming the token is the only way to mint
/// [`GateOutcome::ContinuedWithoutAd`], and consuming moves it — a single
/// unavailable gate can grant feature access at most once.
#[derive(Debug)]
pub struct EscapeHatch {
    _private: (),
}

impl EscapeHatch {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    /// Grant access without an ad.
    pub fn continue_anyway(self) -> GateOutcome {
        GateOutcome::ContinuedWithoutAd
    }
}
