//! Ad-granted feature unlocks.
//!
//! Watching a rewarded ad unlocks one premium feature for a short window
//! (five minutes by default). Unlocks persist across launches, expire on
//! their own, and expired entries are pruned on every read. Storage
//! failures degrade to "locked", never to an error.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::KeyValueStore;
use crate::clock::Clock;

/// Default length of one ad-granted unlock window.
pub const DEFAULT_UNLOCK_DURATION: Duration = Duration::from_secs(5 * 60);

/// Default storage key for the persisted unlock ledger.
pub const DEFAULT_UNLOCK_STORAGE_KEY: &str = "sutradhar_ad_unlocks";

/// Tunables for ad-granted unlocks.
#[derive(Debug, Clone)]
pub struct UnlockConfig {
    /// How long one ad watch unlocks a feature for.
    pub duration: Duration,
    /// Key the ledger is persisted under.
    pub storage_key: String,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_UNLOCK_DURATION,
            storage_key: DEFAULT_UNLOCK_STORAGE_KEY.to_string(),
        }
    }
}

impl UnlockConfig {
    /// Config with the production defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how long one ad watch unlocks a feature for.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the key the ledger is persisted under.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

/// A live unlock for one feature.
///
/// Timestamps are unix epoch milliseconds, matching what earlier app
/// versions wrote, so an upgrade keeps running unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdUnlock {
    /// Feature this unlock covers (the cache feature namespace).
    pub feature: String,
    /// When the unlock was granted.
    pub unlocked_at_ms: i64,
    /// When the unlock lapses.
    pub expires_at_ms: i64,
}

/// Tracks which premium features an ad watch has temporarily unlocked.
///
/// The ledger never decides whether an unlock was earned; run the reward
/// gate (or whatever policy applies) first and call
/// [`unlock`](Self::unlock) on success.
pub struct AdUnlockLedger {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: UnlockConfig,
    /// Serializes read-modify-write cycles on the persisted ledger.
    write_lock: Mutex<()>,
}

impl AdUnlockLedger {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: UnlockConfig) -> Self {
        Self {
            store,
            clock,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// All unlocks still live right now. Expired entries are pruned and the
    /// pruned ledger is written back.
    pub fn active(&self) -> Vec<AdUnlock> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.active_locked()
    }

    /// Whether `feature` is unlocked right now.
    pub fn is_unlocked(&self, feature: &str) -> bool {
        self.active().iter().any(|u| u.feature == feature)
    }

    /// Grant `feature` a fresh unlock window, replacing any running one.
    ///
    /// Returns the granted unlock so callers can surface the expiry.
    pub fn unlock(&self, feature: &str) -> AdUnlock {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut unlocks = self.active_locked();
        unlocks.retain(|u| u.feature != feature);

        let now = self.now_ms();
        let unlock = AdUnlock {
            feature: feature.to_owned(),
            unlocked_at_ms: now,
            expires_at_ms: now + self.config.duration.as_millis() as i64,
        };
        unlocks.push(unlock.clone());
        self.save(&unlocks);
        unlock
    }

    /// Time left on `feature`'s unlock, zero when locked.
    pub fn remaining(&self, feature: &str) -> Duration {
        let now = self.now_ms();
        match self.active().into_iter().find(|u| u.feature == feature) {
            Some(unlock) => Duration::from_millis((unlock.expires_at_ms - now).max(0) as u64),
            None => Duration::ZERO,
        }
    }

    /// Drop every unlock.
    pub fn clear(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.store.remove_item(&self.config.storage_key) {
            warn!(error = %e, "failed to clear ad unlocks");
        }
    }

    /// Prune under an already-held write lock.
    fn active_locked(&self) -> Vec<AdUnlock> {
        let mut unlocks = self.load();
        let now = self.now_ms();
        let before = unlocks.len();
        unlocks.retain(|u| u.expires_at_ms > now);
        if unlocks.len() != before {
            self.save(&unlocks);
        }
        unlocks
    }

    fn load(&self) -> Vec<AdUnlock> {
        match self.store.get_item(&self.config.storage_key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(unlocks) => return unlocks,
                Err(e) => warn!(error = %e, "ad unlock ledger corrupt, discarding"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "ad unlock ledger unreadable, treating as empty"),
        }
        Vec::new()
    }

    fn save(&self, unlocks: &[AdUnlock]) {
        let raw = match serde_json::to_string(unlocks) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to serialize ad unlock ledger");
                return;
            }
        };
        if let Err(e) = self.store.set_item(&self.config.storage_key, &raw) {
            warn!(error = %e, "failed to persist ad unlocks");
        }
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }
}
