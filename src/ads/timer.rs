//! Usage-timer ad schedule.
//!
//! The app shows an interstitial once a randomised stretch of usage time
//! has passed (five to ten minutes by default). The schedule persists
//! across launches so restarting never resets the countdown. Storage
//! failures degrade to a fresh in-memory schedule for the session.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::KeyValueStore;
use crate::clock::Clock;

/// Default lower bound on the gap between timer ads.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default upper bound on the gap between timer ads.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Default storage key for the persisted schedule.
pub const DEFAULT_TIMER_STORAGE_KEY: &str = "sutradhar_timer_ads";

/// Tunables for the timer-ad schedule.
#[derive(Debug, Clone)]
pub struct TimerAdConfig {
    /// Shortest possible gap between two timer ads.
    pub min_interval: Duration,
    /// Longest possible gap between two timer ads.
    pub max_interval: Duration,
    /// Key the schedule is persisted under.
    pub storage_key: String,
}

impl Default for TimerAdConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            storage_key: DEFAULT_TIMER_STORAGE_KEY.to_string(),
        }
    }
}

impl TimerAdConfig {
    /// Config with the production defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shortest gap between two timer ads.
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Set the longest gap between two timer ads.
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    /// Set the key the schedule is persisted under.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

/// Persisted snapshot of the timer-ad schedule.
///
/// Timestamps are unix epoch milliseconds, matching what earlier app
/// versions wrote, so an upgrade keeps the running schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerAdState {
    /// When the last timer ad was shown.
    pub last_shown_ms: i64,
    /// When the next timer ad becomes due.
    pub next_ad_ms: i64,
    /// Accumulated usage time reported via [`TimerAdSchedule::record_usage`].
    pub total_usage_ms: u64,
    /// How many timer ads have been shown.
    pub ad_count: u32,
}

/// Tracks when the next usage-timer ad is due.
pub struct TimerAdSchedule {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: TimerAdConfig,
    /// Serializes read-modify-write cycles on the persisted schedule.
    write_lock: Mutex<()>,
}

impl TimerAdSchedule {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: TimerAdConfig) -> Self {
        Self {
            store,
            clock,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Current schedule. Initialises and persists a fresh one on first use
    /// or when the stored copy is unreadable.
    pub fn state(&self) -> TimerAdState {
        self.load_or_init()
    }

    /// Whether a timer ad is due right now.
    pub fn should_show(&self) -> bool {
        self.load_or_init().next_ad_ms <= self.now_ms()
    }

    /// Stamp the schedule after an ad was shown and roll the next due time.
    pub fn mark_shown(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.load_or_init();
        let now = self.now_ms();
        state.last_shown_ms = now;
        state.next_ad_ms = now + self.roll_interval();
        state.ad_count += 1;
        self.save(&state);
    }

    /// Add a stretch of foreground usage to the running total.
    pub fn record_usage(&self, elapsed: Duration) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.load_or_init();
        state.total_usage_ms += elapsed.as_millis() as u64;
        self.save(&state);
    }

    /// Time remaining until the next ad is due, zero when overdue.
    pub fn time_until_next(&self) -> Duration {
        let remaining = self.load_or_init().next_ad_ms - self.now_ms();
        Duration::from_millis(remaining.max(0) as u64)
    }

    /// Drop the persisted schedule. The next call starts a fresh one.
    pub fn reset(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.store.remove_item(&self.config.storage_key) {
            warn!(error = %e, "failed to clear timer schedule");
        }
    }

    fn load_or_init(&self) -> TimerAdState {
        match self.store.get_item(&self.config.storage_key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(state) => return state,
                Err(e) => warn!(error = %e, "timer schedule corrupt, reinitialising"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "timer schedule unreadable, reinitialising"),
        }
        let state = self.initial_state();
        self.save(&state);
        state
    }

    fn initial_state(&self) -> TimerAdState {
        TimerAdState {
            // Zero means no ad has been shown yet.
            last_shown_ms: 0,
            next_ad_ms: self.now_ms() + self.roll_interval(),
            total_usage_ms: 0,
            ad_count: 0,
        }
    }

    fn save(&self, state: &TimerAdState) {
        let raw = match serde_json::to_string(state) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to serialize timer schedule");
                return;
            }
        };
        if let Err(e) = self.store.set_item(&self.config.storage_key, &raw) {
            warn!(error = %e, "failed to persist timer schedule");
        }
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// Uniform draw from the configured interval range, in milliseconds.
    fn roll_interval(&self) -> i64 {
        let min = self.config.min_interval.as_millis() as i64;
        let max = self.config.max_interval.as_millis() as i64;
        if max <= min {
            return min;
        }
        let mut rng = rand::rng();
        rng.random_range(min..max)
    }
}
