//! Tests for [`TimerAdSchedule`] — the usage-timer interstitial schedule.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sutradhar::ads::{DEFAULT_MAX_INTERVAL, DEFAULT_MIN_INTERVAL, DEFAULT_TIMER_STORAGE_KEY};
use sutradhar::{
    Clock, KeyValueStore, MemoryStore, Result, SutradharError, TimerAdConfig, TimerAdSchedule,
};

/// Clock pinned to a settable instant.
struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Store where every operation fails.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(SutradharError::Storage("disk gone".into()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(SutradharError::Storage("disk gone".into()))
    }

    fn remove_item(&self, _key: &str) -> Result<()> {
        Err(SutradharError::Storage("disk gone".into()))
    }
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

fn schedule_at(now: DateTime<Utc>) -> (TimerAdSchedule, Arc<MemoryStore>, Arc<FixedClock>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::at(now));
    let schedule = TimerAdSchedule::new(store.clone(), clock.clone(), TimerAdConfig::default());
    (schedule, store, clock)
}

// =========================================================================
// TimerAdConfig
// =========================================================================

#[test]
fn config_defaults() {
    let config = TimerAdConfig::default();
    assert_eq!(config.min_interval, DEFAULT_MIN_INTERVAL);
    assert_eq!(config.max_interval, DEFAULT_MAX_INTERVAL);
    assert_eq!(config.storage_key, DEFAULT_TIMER_STORAGE_KEY);
}

#[test]
fn config_builder() {
    let config = TimerAdConfig::new()
        .min_interval(Duration::from_secs(60))
        .max_interval(Duration::from_secs(120))
        .storage_key("custom_timer");
    assert_eq!(config.min_interval, Duration::from_secs(60));
    assert_eq!(config.max_interval, Duration::from_secs(120));
    assert_eq!(config.storage_key, "custom_timer");
}

// =========================================================================
// Scheduling
// =========================================================================

#[test]
fn initial_schedule_lands_in_the_window() {
    let (schedule, _, clock) = schedule_at(noon());

    let state = schedule.state();
    let gap = state.next_ad_ms - clock.now().timestamp_millis();

    assert_eq!(state.last_shown_ms, 0); // nothing shown yet
    assert_eq!(state.ad_count, 0);
    assert_eq!(state.total_usage_ms, 0);
    assert!(gap >= DEFAULT_MIN_INTERVAL.as_millis() as i64);
    assert!(gap <= DEFAULT_MAX_INTERVAL.as_millis() as i64);
}

#[test]
fn not_due_until_the_interval_elapses() {
    let (schedule, _, clock) = schedule_at(noon());

    assert!(!schedule.should_show());

    // A minute in, still inside even the shortest interval.
    clock.advance(chrono::Duration::minutes(1));
    assert!(!schedule.should_show());

    // Past the longest interval, an ad is definitely due.
    clock.advance(chrono::Duration::minutes(10));
    assert!(schedule.should_show());
}

#[test]
fn mark_shown_rolls_the_next_due_time() {
    let (schedule, _, clock) = schedule_at(noon());

    clock.advance(chrono::Duration::minutes(11));
    assert!(schedule.should_show());

    schedule.mark_shown();
    let state = schedule.state();

    assert_eq!(state.last_shown_ms, clock.now().timestamp_millis());
    assert_eq!(state.ad_count, 1);
    assert!(!schedule.should_show()); // countdown restarted

    let gap = state.next_ad_ms - clock.now().timestamp_millis();
    assert!(gap >= DEFAULT_MIN_INTERVAL.as_millis() as i64);
    assert!(gap <= DEFAULT_MAX_INTERVAL.as_millis() as i64);
}

#[test]
fn equal_bounds_collapse_to_a_fixed_interval() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::at(noon()));
    let config = TimerAdConfig::new()
        .min_interval(Duration::from_secs(60))
        .max_interval(Duration::from_secs(60));
    let schedule = TimerAdSchedule::new(store, clock, config);

    assert_eq!(schedule.time_until_next(), Duration::from_secs(60));
}

#[test]
fn time_until_next_counts_down_to_zero() {
    let (schedule, _, clock) = schedule_at(noon());

    let initial = schedule.time_until_next();
    assert!(initial >= DEFAULT_MIN_INTERVAL);
    assert!(initial <= DEFAULT_MAX_INTERVAL);

    clock.advance(chrono::Duration::minutes(2));
    let later = schedule.time_until_next();
    assert_eq!(later, initial - Duration::from_secs(120));

    // Overdue clamps to zero instead of going negative.
    clock.advance(chrono::Duration::minutes(30));
    assert_eq!(schedule.time_until_next(), Duration::ZERO);
}

// =========================================================================
// Usage accounting
// =========================================================================

#[test]
fn usage_time_accumulates() {
    let (schedule, _, _) = schedule_at(noon());

    schedule.record_usage(Duration::from_secs(30));
    schedule.record_usage(Duration::from_secs(45));

    assert_eq!(schedule.state().total_usage_ms, 75_000);
}

// =========================================================================
// Persistence
// =========================================================================

#[test]
fn schedule_persists_across_instances() {
    let (schedule, store, clock) = schedule_at(noon());

    clock.advance(chrono::Duration::minutes(11));
    schedule.mark_shown();
    schedule.record_usage(Duration::from_secs(10));
    let state = schedule.state();

    // A relaunch sees the same running schedule, countdown intact.
    let reopened = TimerAdSchedule::new(store, clock, TimerAdConfig::default());
    assert_eq!(reopened.state(), state);
}

#[test]
fn reset_starts_a_fresh_schedule() {
    let (schedule, _, clock) = schedule_at(noon());

    clock.advance(chrono::Duration::minutes(11));
    schedule.mark_shown();
    assert_eq!(schedule.state().ad_count, 1);

    schedule.reset();
    let state = schedule.state();
    assert_eq!(state.ad_count, 0);
    assert_eq!(state.last_shown_ms, 0);
    assert!(!schedule.should_show());
}

#[test]
fn corrupt_state_reinitialises() {
    let store = Arc::new(MemoryStore::new());
    store.set_item(DEFAULT_TIMER_STORAGE_KEY, "{ not json").unwrap();
    let clock = Arc::new(FixedClock::at(noon()));
    let schedule = TimerAdSchedule::new(store.clone(), clock, TimerAdConfig::default());

    let state = schedule.state();
    assert_eq!(state.ad_count, 0);

    // The fresh schedule was written back over the garbage.
    let raw = store.get_item(DEFAULT_TIMER_STORAGE_KEY).unwrap().unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
}

#[test]
fn broken_store_degrades_to_a_session_schedule() {
    let clock = Arc::new(FixedClock::at(noon()));
    let schedule = TimerAdSchedule::new(Arc::new(BrokenStore), clock, TimerAdConfig::default());

    // Nothing persists, but nothing panics either.
    assert!(!schedule.should_show());
    schedule.mark_shown();
    schedule.record_usage(Duration::from_secs(5));
    schedule.reset();
    assert_eq!(schedule.state().total_usage_ms, 0);
}
