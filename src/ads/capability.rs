//! The native ad capability boundary.

use async_trait::async_trait;

use crate::error::{Result, SutradharError};
use crate::types::{AdFormat, RewardOutcome};

/// Interface to a platform ad SDK.
///
/// Implementations bridge whatever the platform offers: an AdMob plugin on
/// mobile, nothing at all on web. Only `load`, `show`, and `name` are
/// required; the rest default to [`SutradharError::CapabilityUnavailable`],
/// which [`AdProvider`](super::AdProvider) degrades to a no-op or `false`.
/// A partially implemented SDK behaves exactly as if the method were never
/// there.
///
/// # Initialization
///
/// An SDK that has not finished initialising must fail loads with
/// [`SutradharError::NotInitialized`]; that is the one error load retries
/// back off and try again on.
#[async_trait]
pub trait AdCapability: Send + Sync {
    /// Capability name for logging/debugging.
    fn name(&self) -> &str;

    /// Request an ad of the given format from the network.
    async fn load(&self, format: AdFormat) -> Result<()>;

    /// Present a loaded ad.
    async fn show(&self, format: AdFormat) -> Result<()>;

    /// Present a loaded rewarded ad and report whether the reward was
    /// earned.
    async fn show_rewarded(&self) -> Result<RewardOutcome> {
        Err(SutradharError::CapabilityUnavailable)
    }

    /// Whether an ad of the given format is ready to present.
    async fn is_ready(&self, format: AdFormat) -> Result<bool> {
        let _ = format;
        Err(SutradharError::CapabilityUnavailable)
    }

    /// Hide a persistent surface (banner/native) without destroying it.
    async fn hide(&self, format: AdFormat) -> Result<()> {
        let _ = format;
        Err(SutradharError::CapabilityUnavailable)
    }

    /// Destroy a persistent surface (banner/native).
    async fn remove(&self, format: AdFormat) -> Result<()> {
        let _ = format;
        Err(SutradharError::CapabilityUnavailable)
    }
}
