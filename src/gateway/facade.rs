//! The assembled gateway: readings in front, ads behind.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::ads::{AdOrchestrator, AdProvider, AdUnlockLedger, TimerAdSchedule};
use crate::cache::ResponseCache;
use crate::reading::{ReadingService, UsageMeter};
use crate::types::{GateAttempt, ReadingRequest};
use crate::{Result, SutradharError};

use super::SutradharBuilder;

/// The assembled monetization-and-reading core.
///
/// Construct via [`Sutradhar::builder`]. Readings flow through the
/// day-scoped cache; ads run through the reward gate and post-action
/// protocols. The two sides share nothing but the storage, so ad
/// failures can never cost a user a reading that was already produced.
pub struct Sutradhar {
    provider: Arc<AdProvider>,
    ads: AdOrchestrator,
    cache: Arc<ResponseCache>,
    reading: Option<ReadingService>,
    timer_ads: TimerAdSchedule,
    unlocks: AdUnlockLedger,
    usage: UsageMeter,
}

impl Sutradhar {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> SutradharBuilder {
        SutradharBuilder::new()
    }

    pub(crate) fn new(
        provider: Arc<AdProvider>,
        ads: AdOrchestrator,
        cache: Arc<ResponseCache>,
        reading: Option<ReadingService>,
        timer_ads: TimerAdSchedule,
        unlocks: AdUnlockLedger,
        usage: UsageMeter,
    ) -> Self {
        Self {
            provider,
            ads,
            cache,
            reading,
            timer_ads,
            unlocks,
            usage,
        }
    }

    /// Fetch a reading through the cache, calling the backend at most once
    /// per UTC day for a given request.
    ///
    /// Errors with [`SutradharError::NoBackend`] when the gateway was
    /// built without a reading backend.
    pub async fn reading(&self, request: &ReadingRequest) -> Result<Value> {
        self.reading_service()?.reading(request).await
    }

    /// [`reading`](Self::reading) deserialized into a typed payload.
    pub async fn reading_as<T: DeserializeOwned>(&self, request: &ReadingRequest) -> Result<T> {
        self.reading_service()?.reading_as(request).await
    }

    /// Warm the rewarded slot; call when the gate UI opens.
    pub async fn prepare_gate(&self) {
        self.ads.prepare().await;
    }

    /// Run the reward gate for a premium feature.
    pub async fn reward_gate(&self) -> GateAttempt {
        self.ads.reward_gate().await
    }

    /// Schedule a detached interstitial after a completed action.
    pub fn post_action_ad(&self, delay: Option<Duration>) -> JoinHandle<bool> {
        self.ads.post_action_ad(delay)
    }

    /// [`post_action_ad`](Self::post_action_ad) with a callback invoked
    /// right after the ad is presented.
    pub fn post_action_ad_with(
        &self,
        delay: Option<Duration>,
        on_shown: impl FnOnce() + Send + 'static,
    ) -> JoinHandle<bool> {
        self.ads.post_action_ad_with(delay, on_shown)
    }

    /// The ad orchestrator.
    pub fn ads(&self) -> &AdOrchestrator {
        &self.ads
    }

    /// The ad provider underneath the orchestrator.
    pub fn provider(&self) -> &Arc<AdProvider> {
        &self.provider
    }

    /// The day-scoped response cache.
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// The usage-timer ad schedule.
    pub fn timer_ads(&self) -> &TimerAdSchedule {
        &self.timer_ads
    }

    /// The ledger of ad-granted feature unlocks. Pair it with
    /// [`reward_gate`](Self::reward_gate): gate first, unlock on success.
    pub fn unlocks(&self) -> &AdUnlockLedger {
        &self.unlocks
    }

    /// The free-tier daily usage meter.
    pub fn usage(&self) -> &UsageMeter {
        &self.usage
    }

    fn reading_service(&self) -> Result<&ReadingService> {
        self.reading.as_ref().ok_or(SutradharError::NoBackend)
    }
}
