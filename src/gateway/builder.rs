//! Builder for configuring [`Sutradhar`] instances.

use std::sync::Arc;

use crate::ads::{
    AdCapability, AdOrchestrator, AdProvider, AdTimings, AdUnlockLedger, LoadRetryConfig,
    TimerAdConfig, TimerAdSchedule, UnlockConfig,
};
use crate::cache::{CacheConfig, KeyValueStore, MemoryStore, ResponseCache};
use crate::clock::{Clock, SystemClock};
use crate::reading::{ReadingBackend, ReadingService, UsageConfig, UsageMeter};
use crate::{Result, SutradharError};

use super::Sutradhar;

/// Builder for configuring [`Sutradhar`] instances.
///
/// Both the ad capability and the reading backend are optional on their
/// own (a web build has no ad SDK; an ads-only integration has no AI
/// backend), but configuring neither is a configuration error.
pub struct SutradharBuilder {
    capability: Option<Arc<dyn AdCapability>>,
    backend: Option<Arc<dyn ReadingBackend>>,
    storage: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
    cache_config: CacheConfig,
    load_retry: LoadRetryConfig,
    timings: AdTimings,
    timer_config: TimerAdConfig,
    unlock_config: UnlockConfig,
    usage_config: UsageConfig,
}

impl SutradharBuilder {
    pub fn new() -> Self {
        Self {
            capability: None,
            backend: None,
            storage: None,
            clock: None,
            cache_config: CacheConfig::default(),
            load_retry: LoadRetryConfig::default(),
            timings: AdTimings::default(),
            timer_config: TimerAdConfig::default(),
            unlock_config: UnlockConfig::default(),
            usage_config: UsageConfig::default(),
        }
    }

    /// Attach the native ad SDK. Omit on platforms without one; every ad
    /// operation then degrades to a no-op.
    pub fn capability(mut self, capability: Arc<dyn AdCapability>) -> Self {
        self.capability = Some(capability);
        self
    }

    /// Attach the generative backend that produces readings.
    pub fn backend(mut self, backend: Arc<dyn ReadingBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Persistence for the response cache and the timer-ad schedule.
    /// Defaults to an in-memory store.
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Clock used for cache day scoping and the timer-ad schedule.
    /// Defaults to the system UTC clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Override the response cache bounds and storage key.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Override the load retry budget used by the reward gate.
    pub fn load_retry(mut self, config: LoadRetryConfig) -> Self {
        self.load_retry = config;
        self
    }

    /// Override the ad protocol timings.
    pub fn timings(mut self, timings: AdTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Override the timer-ad interval bounds and storage key.
    pub fn timer_config(mut self, config: TimerAdConfig) -> Self {
        self.timer_config = config;
        self
    }

    /// Override the ad-granted unlock window and storage key.
    pub fn unlock_config(mut self, config: UnlockConfig) -> Self {
        self.unlock_config = config;
        self
    }

    /// Override the free-tier daily limits and storage key.
    pub fn usage_config(mut self, config: UsageConfig) -> Self {
        self.usage_config = config;
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<Sutradhar> {
        // Must have at least one collaborator wired in.
        if self.capability.is_none() && self.backend.is_none() {
            return Err(SutradharError::Configuration(
                "neither an ad capability nor a reading backend is configured".to_string(),
            ));
        }

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let provider = Arc::new(
            match self.capability {
                Some(capability) => AdProvider::new(capability),
                None => AdProvider::unavailable(),
            }
            .show_settle(self.timings.show_settle),
        );

        let ads = AdOrchestrator::new(Arc::clone(&provider))
            .load_retry(self.load_retry)
            .timings(self.timings);

        let cache = Arc::new(ResponseCache::new(
            Arc::clone(&storage),
            Arc::clone(&clock),
            self.cache_config,
        ));

        let reading = self
            .backend
            .map(|backend| ReadingService::new(backend, Arc::clone(&cache)));

        let timer_ads =
            TimerAdSchedule::new(Arc::clone(&storage), Arc::clone(&clock), self.timer_config);
        let unlocks =
            AdUnlockLedger::new(Arc::clone(&storage), Arc::clone(&clock), self.unlock_config);
        let usage = UsageMeter::new(Arc::clone(&storage), Arc::clone(&clock), self.usage_config);

        Ok(Sutradhar::new(
            provider, ads, cache, reading, timer_ads, unlocks, usage,
        ))
    }
}

impl Default for SutradharBuilder {
    fn default() -> Self {
        Self::new()
    }
}
