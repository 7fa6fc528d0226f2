//! Tests for [`ResponseCache`] — day-scoped, bounded, key-canonical.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sutradhar::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_RETAIN_ENTRIES, DEFAULT_STORAGE_KEY};
use sutradhar::{
    CacheConfig, Clock, KeyValueStore, MemoryStore, ResponseCache, Result, SutradharError,
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

/// Store whose writes always fail.
struct ReadOnlyStore {
    inner: MemoryStore,
}

impl KeyValueStore for ReadOnlyStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(SutradharError::Storage("read-only".into()))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.inner.remove_item(key)
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

fn cache_at(now: DateTime<Utc>) -> (ResponseCache, Arc<MemoryStore>, Arc<FixedClock>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::at(now));
    let cache = ResponseCache::new(store.clone(), clock.clone(), CacheConfig::default());
    (cache, store, clock)
}

// =========================================================================
// CacheConfig
// =========================================================================

#[test]
fn cache_config_defaults() {
    let config = CacheConfig::default();
    assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
    assert_eq!(config.retain_entries, DEFAULT_RETAIN_ENTRIES);
    assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
}

#[test]
fn cache_config_builder() {
    let config = CacheConfig::new()
        .max_entries(10)
        .retain_entries(8)
        .storage_key("custom_cache");
    assert_eq!(config.max_entries, 10);
    assert_eq!(config.retain_entries, 8);
    assert_eq!(config.storage_key, "custom_cache");
}

// =========================================================================
// Hit/miss basics
// =========================================================================

#[test]
fn miss_then_hit() {
    let (cache, _, _) = cache_at(noon());
    let input = json!({ "name": "Asha", "birth_date": "1994-03-21" });

    assert!(cache.get::<Value>("numerology", &input).is_none());

    cache.set("numerology", &input, &json!({ "lucky_number": 7 }));

    let got = cache.get::<Value>("numerology", &input);
    assert_eq!(got, Some(json!({ "lucky_number": 7 })));
}

#[test]
fn key_order_does_not_matter() {
    let (cache, _, _) = cache_at(noon());

    cache.set(
        "compatibility",
        &json!({ "person_a": "Asha", "person_b": "Vikram" }),
        &json!({ "score": 82 }),
    );

    // Same object, reordered keys, nested object reordered too.
    let reordered = json!({ "person_b": "Vikram", "person_a": "Asha" });
    assert_eq!(
        cache.get::<Value>("compatibility", &reordered),
        Some(json!({ "score": 82 }))
    );
}

#[test]
fn distinct_features_do_not_collide() {
    let (cache, _, _) = cache_at(noon());
    let input = json!("left_hand");

    cache.set("palm", &input, &json!({ "reading": "long life line" }));

    assert!(cache.get::<Value>("face", &input).is_none());
    assert!(cache.get::<Value>("palm", &input).is_some());
}

#[test]
fn set_replaces_existing_entry() {
    let (cache, _, _) = cache_at(noon());
    let input = json!({ "card": "the-tower" });

    cache.set("tarot", &input, &json!({ "meaning": "upheaval" }));
    cache.set("tarot", &input, &json!({ "meaning": "revelation" }));

    assert_eq!(cache.len(), 1);
    assert_eq!(
        cache.get::<Value>("tarot", &input),
        Some(json!({ "meaning": "revelation" }))
    );
}

#[test]
fn typed_get_round_trips() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Reading {
        text: String,
        score: u32,
    }

    let (cache, _, _) = cache_at(noon());
    let input = json!({ "name": "Asha" });
    let reading = Reading {
        text: "a fortunate year".into(),
        score: 9,
    };

    cache.set("numerology", &input, &reading);
    assert_eq!(cache.get::<Reading>("numerology", &input), Some(reading));
}

#[test]
fn clear_empties_the_day() {
    let (cache, _, _) = cache_at(noon());
    let input = json!({ "name": "Asha" });

    cache.set("numerology", &input, &json!(1));
    assert!(!cache.is_empty());

    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.get::<Value>("numerology", &input).is_none());
}

// =========================================================================
// Day scoping
// =========================================================================

#[test]
fn entries_expire_on_day_rollover() {
    let (cache, _, clock) = cache_at(noon());
    let input = json!({ "name": "Asha" });

    cache.set("numerology", &input, &json!(1));
    assert!(cache.get::<Value>("numerology", &input).is_some());

    clock.advance(chrono::Duration::days(1));
    assert!(cache.get::<Value>("numerology", &input).is_none());
    assert!(cache.is_empty());
}

#[test]
fn expiry_is_utc_midnight_not_a_24h_window() {
    let late = Utc.with_ymd_and_hms(2025, 6, 15, 23, 30, 0).unwrap();
    let (cache, _, clock) = cache_at(late);
    let input = json!({ "name": "Asha" });

    cache.set("numerology", &input, &json!(1));

    // One hour later, but it is a new UTC day.
    clock.advance(chrono::Duration::hours(1));
    assert!(cache.get::<Value>("numerology", &input).is_none());
}

#[test]
fn new_day_accepts_fresh_entries() {
    let (cache, _, clock) = cache_at(noon());
    let input = json!({ "name": "Asha" });

    cache.set("numerology", &input, &json!("yesterday"));
    clock.advance(chrono::Duration::days(1));

    cache.set("numerology", &input, &json!("today"));
    assert_eq!(
        cache.get::<Value>("numerology", &input),
        Some(json!("today"))
    );
    assert_eq!(cache.len(), 1); // yesterday's entry is gone
}

// =========================================================================
// Size bound
// =========================================================================

#[test]
fn bound_holds_and_newest_survive() {
    let (cache, _, _) = cache_at(noon());

    for i in 0..60 {
        cache.set("tarot", &json!({ "draw": i }), &json!(i));
        assert!(cache.len() <= DEFAULT_MAX_ENTRIES);
    }

    // 60 inserts: one trim at 51 down to 40, then 9 more inserts.
    assert_eq!(cache.len(), 49);

    // The 40 most recent inserts all survive.
    for i in 20..60 {
        assert!(
            cache.get::<Value>("tarot", &json!({ "draw": i })).is_some(),
            "entry {i} should have survived"
        );
    }
    // The oldest were dropped by the trim.
    for i in 0..11 {
        assert!(
            cache.get::<Value>("tarot", &json!({ "draw": i })).is_none(),
            "entry {i} should have been evicted"
        );
    }
}

#[test]
fn replacing_does_not_grow_toward_the_bound() {
    let (cache, _, _) = cache_at(noon());
    let input = json!({ "name": "Asha" });

    for i in 0..100 {
        cache.set("numerology", &input, &json!(i));
    }
    assert_eq!(cache.len(), 1);
}

// =========================================================================
// Persistence
// =========================================================================

#[test]
fn persists_across_instances() {
    let (cache, store, clock) = cache_at(noon());
    let input = json!({ "name": "Asha" });

    cache.set("numerology", &input, &json!({ "lucky_number": 7 }));

    // A second instance over the same store sees the entry.
    let reopened = ResponseCache::new(store, clock, CacheConfig::default());
    assert_eq!(
        reopened.get::<Value>("numerology", &input),
        Some(json!({ "lucky_number": 7 }))
    );
}

#[test]
fn corrupt_store_reads_as_empty() {
    let store = Arc::new(MemoryStore::new());
    store
        .set_item(DEFAULT_STORAGE_KEY, "{ not json")
        .unwrap();

    let clock = Arc::new(FixedClock::at(noon()));
    let cache = ResponseCache::new(store, clock, CacheConfig::default());
    let input = json!({ "name": "Asha" });

    assert!(cache.get::<Value>("numerology", &input).is_none());

    // And the store recovers on the next write.
    cache.set("numerology", &input, &json!(1));
    assert!(cache.get::<Value>("numerology", &input).is_some());
}

#[test]
fn write_failure_is_absorbed() {
    let store = Arc::new(ReadOnlyStore {
        inner: MemoryStore::new(),
    });
    let clock = Arc::new(FixedClock::at(noon()));
    let cache = ResponseCache::new(store, clock, CacheConfig::default());
    let input = json!({ "name": "Asha" });

    // No panic, no error; the entry simply does not persist.
    cache.set("numerology", &input, &json!(1));
    assert!(cache.get::<Value>("numerology", &input).is_none());
}

#[test]
fn broken_store_degrades_to_miss() {
    let clock = Arc::new(FixedClock::at(noon()));
    let cache = ResponseCache::new(Arc::new(BrokenStore), clock, CacheConfig::default());
    let input = json!({ "name": "Asha" });

    assert!(cache.get::<Value>("numerology", &input).is_none());
    cache.set("numerology", &input, &json!(1)); // swallowed
    assert!(cache.get::<Value>("numerology", &input).is_none());
}

// =========================================================================
// Concurrency
// =========================================================================

#[test]
fn concurrent_writers_respect_the_bound() {
    use std::thread;

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::at(noon()));
    let cache = Arc::new(ResponseCache::new(
        store,
        clock,
        CacheConfig::default(),
    ));

    let mut handles = Vec::new();
    for t in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..30 {
                cache.set("tarot", &json!({ "thread": t, "draw": i }), &json!(i));
            }
        }));
    }
    for h in handles {
        h.join().expect("thread panicked");
    }

    assert!(cache.len() <= DEFAULT_MAX_ENTRIES);
}
