//! Clock abstraction for day-scoped caching and timer scheduling.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current UTC time.
///
/// The cache day boundary and the timer-ad schedule both key off wall-clock
/// time; injecting a clock makes day rollover and interval arithmetic
/// testable without waiting for midnight.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The real clock ([`Utc::now`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
