//! Free-tier daily usage limits for AI features.
//!
//! Each feature gets a small number of free backend calls per UTC day
//! (one by default), and a rewarded ad can earn one bonus use on top,
//! once per feature per day. A subscription lifts every limit; flip
//! [`set_unlimited`](UsageMeter::set_unlimited) while one is active. The
//! whole ledger resets at day rollover, the same way the response cache
//! does.
//!
//! The meter only counts; it never blocks a reading on its own. Check
//! [`can_use`](UsageMeter::can_use) before generating and
//! [`record_use`](UsageMeter::record_use) after.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::KeyValueStore;
use crate::clock::Clock;

/// Default free uses per feature per day.
pub const DEFAULT_DAILY_LIMIT: u32 = 1;

/// Default ad-earned bonus uses per feature per day.
pub const DEFAULT_MAX_BONUS: u32 = 1;

/// Default storage key for the persisted usage document.
pub const DEFAULT_USAGE_STORAGE_KEY: &str = "sutradhar_free_usage";

/// Tunables for the free-tier usage meter.
#[derive(Debug, Clone)]
pub struct UsageConfig {
    /// Free uses per feature per day.
    pub daily_limit: u32,
    /// Ad-earned bonus uses per feature per day.
    pub max_bonus: u32,
    /// Key the usage document is persisted under.
    pub storage_key: String,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            max_bonus: DEFAULT_MAX_BONUS,
            storage_key: DEFAULT_USAGE_STORAGE_KEY.to_string(),
        }
    }
}

impl UsageConfig {
    /// Config with the production defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free uses per feature per day.
    pub fn daily_limit(mut self, limit: u32) -> Self {
        self.daily_limit = limit;
        self
    }

    /// Set the ad-earned bonus uses per feature per day.
    pub fn max_bonus(mut self, bonus: u32) -> Self {
        self.max_bonus = bonus;
        self
    }

    /// Set the key the usage document is persisted under.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

/// The persisted day document: per-feature use and bonus counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UsageDay {
    date: NaiveDate,
    #[serde(default)]
    used: BTreeMap<String, u32>,
    #[serde(default)]
    bonuses: BTreeMap<String, u32>,
}

/// Day-scoped free-usage meter over a [`KeyValueStore`].
pub struct UsageMeter {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: UsageConfig,
    unlimited: AtomicBool,
    /// Serializes read-modify-write cycles on the persisted document.
    write_lock: Mutex<()>,
}

impl UsageMeter {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: UsageConfig) -> Self {
        Self {
            store,
            clock,
            config,
            unlimited: AtomicBool::new(false),
            write_lock: Mutex::new(()),
        }
    }

    /// Lift every limit, or restore them. Flip this alongside the user's
    /// subscription state.
    pub fn set_unlimited(&self, unlimited: bool) {
        self.unlimited.store(unlimited, Ordering::Relaxed);
    }

    /// Whether limits are currently lifted.
    pub fn is_unlimited(&self) -> bool {
        self.unlimited.load(Ordering::Relaxed)
    }

    /// Whether `feature` has a free (or ad-earned bonus) use left today.
    pub fn can_use(&self, feature: &str) -> bool {
        if self.is_unlimited() {
            return true;
        }
        let day = self.load_day();
        used(&day, feature) < self.limit_for(&day, feature)
    }

    /// Free uses left for `feature` today. `None` when limits are lifted.
    pub fn remaining(&self, feature: &str) -> Option<u32> {
        if self.is_unlimited() {
            return None;
        }
        let day = self.load_day();
        Some(self.limit_for(&day, feature).saturating_sub(used(&day, feature)))
    }

    /// Count one use of `feature`. No-op while limits are lifted.
    pub fn record_use(&self, feature: &str) {
        if self.is_unlimited() {
            return;
        }
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut day = self.load_day();
        *day.used.entry(feature.to_owned()).or_insert(0) += 1;
        self.save_day(&day);
    }

    /// Whether `feature` is out of free uses but still eligible for an
    /// ad-earned bonus today. Always `false` while limits are lifted.
    pub fn can_earn_bonus(&self, feature: &str) -> bool {
        if self.is_unlimited() {
            return false;
        }
        let day = self.load_day();
        used(&day, feature) >= self.config.daily_limit
            && bonus(&day, feature) < self.config.max_bonus
    }

    /// Credit one ad-earned bonus use for `feature`, up to the daily cap.
    /// No-op while limits are lifted.
    pub fn grant_bonus(&self, feature: &str) {
        if self.is_unlimited() {
            return;
        }
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut day = self.load_day();
        let granted = day.bonuses.entry(feature.to_owned()).or_insert(0);
        if *granted >= self.config.max_bonus {
            return;
        }
        *granted += 1;
        self.save_day(&day);
    }

    /// Drop the persisted document; the day starts over.
    pub fn reset(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.store.remove_item(&self.config.storage_key) {
            warn!(error = %e, "failed to clear usage document");
        }
    }

    /// Today's cap for `feature`: the base limit plus any bonuses already
    /// granted.
    fn limit_for(&self, day: &UsageDay, feature: &str) -> u32 {
        self.config.daily_limit + bonus(day, feature)
    }

    /// Read the persisted document. A stale date, a storage failure, or a
    /// parse failure all read as a fresh day; the reset is not written back,
    /// the next increment persists it.
    fn load_day(&self) -> UsageDay {
        let today = self.clock.today();
        let fresh = UsageDay {
            date: today,
            used: BTreeMap::new(),
            bonuses: BTreeMap::new(),
        };
        let raw = match self.store.get_item(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fresh,
            Err(e) => {
                warn!(error = %e, "failed to read usage document, treating as fresh");
                return fresh;
            }
        };
        match serde_json::from_str::<UsageDay>(&raw) {
            Ok(day) if day.date == today => day,
            Ok(_) => fresh,
            Err(e) => {
                warn!(error = %e, "corrupt usage document, treating as fresh");
                fresh
            }
        }
    }

    fn save_day(&self, day: &UsageDay) {
        let raw = match serde_json::to_string(day) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to serialize usage document");
                return;
            }
        };
        if let Err(e) = self.store.set_item(&self.config.storage_key, &raw) {
            warn!(error = %e, "failed to persist usage document");
        }
    }
}

fn used(day: &UsageDay, feature: &str) -> u32 {
    day.used.get(feature).copied().unwrap_or(0)
}

fn bonus(day: &UsageDay, feature: &str) -> u32 {
    day.bonuses.get(feature).copied().unwrap_or(0)
}
