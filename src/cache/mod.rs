//! Day-scoped cache for AI-generated readings.
//!
//! A reading for a fixed input is treated as stable for one calendar day:
//! asking the same question twice on the same UTC day must reach the
//! backend exactly once. [`ResponseCache`] keeps one JSON document per day
//! behind a [`KeyValueStore`]; when the stored date is not today, the whole
//! document reads as empty and the next write replaces it.
//!
//! # Failure policy
//!
//! Cache trouble must never break a reading. `get` treats storage and parse
//! failures as misses; `set` logs and counts a failed write and moves on.
//! Neither returns an error.

mod key;
mod store;

pub use key::{LONG_INPUT_THRESHOLD, SLUG_MAX_LEN};
pub use store::{FileStore, KeyValueStore, MemoryStore};

use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::clock::Clock;
use crate::telemetry;

/// Default storage key for the persisted day document.
pub const DEFAULT_STORAGE_KEY: &str = "sutradhar_ai_cache";

/// Default hard cap on stored entries.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Default entry count kept after trimming an over-full store.
pub const DEFAULT_RETAIN_ENTRIES: usize = 40;

/// Configuration for the day cache.
///
/// ```rust
/// # use sutradhar::CacheConfig;
/// let config = CacheConfig::new()
///     .max_entries(100)
///     .retain_entries(80);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Hard cap on stored entries. Default: 50.
    pub max_entries: usize,
    /// Entries kept once `max_entries` is exceeded; the newest survive.
    /// Default: 40.
    pub retain_entries: usize,
    /// Storage key for the persisted day document.
    pub storage_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            retain_entries: DEFAULT_RETAIN_ENTRIES,
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }
}

impl CacheConfig {
    /// Create a new config with the default bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hard cap on stored entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set how many entries a trim keeps.
    pub fn retain_entries(mut self, n: usize) -> Self {
        self.retain_entries = n;
        self
    }

    /// Set the storage key for the persisted document.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

/// One cached reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    key: String,
    value: Value,
}

/// The persisted day document. Entry order is insertion order; trims drop
/// from the front.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheDay {
    date: NaiveDate,
    entries: Vec<CacheEntry>,
}

/// Day-scoped response cache over a [`KeyValueStore`].
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    /// Serializes read-modify-write cycles on the persisted document.
    write_lock: Mutex<()>,
}

impl ResponseCache {
    /// Create a cache over the given store and clock.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: CacheConfig) -> Self {
        Self {
            store,
            clock,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Look up a cached value for `(feature, input)`.
    ///
    /// `None` on miss, on a stale day, and on any storage or parse failure.
    /// Emits cache hit/miss counters.
    pub fn get<T: DeserializeOwned>(&self, feature: &str, input: &Value) -> Option<T> {
        let key = key::derive_key(feature, input);
        let found = self
            .load_day()
            .entries
            .into_iter()
            .find(|e| e.key == key)
            .and_then(|e| serde_json::from_value(e.value).ok());
        match found {
            Some(value) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "feature" => feature.to_owned())
                    .increment(1);
                Some(value)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "feature" => feature.to_owned())
                    .increment(1);
                None
            }
        }
    }

    /// Store a value for `(feature, input)`.
    ///
    /// Stamps today's date, replaces an existing entry in place, trims to
    /// the retention bound when over-full, and persists. Persistence
    /// failures are logged and counted, never returned.
    pub fn set<T: Serialize>(&self, feature: &str, input: &Value, value: &T) {
        let json = match serde_json::to_value(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(feature, error = %e, "value not serializable, skipping cache write");
                return;
            }
        };
        let key = key::derive_key(feature, input);

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut day = self.load_day();
        day.date = self.clock.today();
        match day.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.value = json,
            None => day.entries.push(CacheEntry { key, value: json }),
        }
        if day.entries.len() > self.config.max_entries {
            let excess = day.entries.len() - self.config.retain_entries;
            day.entries.drain(..excess);
        }
        self.save_day(&day);
    }

    /// Drop the persisted document entirely.
    pub fn clear(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.store.remove_item(&self.config.storage_key) {
            warn!(error = %e, "failed to clear response cache");
        }
    }

    /// Number of entries stored for today.
    pub fn len(&self) -> usize {
        self.load_day().entries.len()
    }

    /// Whether today's store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the persisted document. A stale date, a storage failure, or a
    /// parse failure all read as an empty store for today; the reset is not
    /// written back, the next `set` persists the fresh day.
    fn load_day(&self) -> CacheDay {
        let today = self.clock.today();
        let fresh = CacheDay {
            date: today,
            entries: Vec::new(),
        };
        let raw = match self.store.get_item(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fresh,
            Err(e) => {
                warn!(error = %e, "failed to read response cache, treating as empty");
                return fresh;
            }
        };
        match serde_json::from_str::<CacheDay>(&raw) {
            Ok(day) if day.date == today => day,
            Ok(_) => fresh,
            Err(e) => {
                warn!(error = %e, "corrupt response cache document, treating as empty");
                fresh
            }
        }
    }

    fn save_day(&self, day: &CacheDay) {
        let serialized = match serde_json::to_string(day) {
            Ok(serialized) => serialized,
            Err(e) => {
                metrics::counter!(telemetry::CACHE_WRITE_FAILURES_TOTAL).increment(1);
                warn!(error = %e, "failed to serialize response cache document");
                return;
            }
        };
        if let Err(e) = self.store.set_item(&self.config.storage_key, &serialized) {
            metrics::counter!(telemetry::CACHE_WRITE_FAILURES_TOTAL).increment(1);
            warn!(error = %e, "failed to persist response cache");
        }
    }
}
