//! Sutradhar - ad orchestration and day-scoped reading cache
//!
//! The monetization-and-reading core of a hybrid astrology app. On the ad
//! side: a uniform [`AdProvider`] over a possibly-absent native ad SDK, an
//! [`AdOrchestrator`] running the reward-gate and post-action protocols,
//! and the persisted ledgers that decide when a timer ad is due and which
//! features an ad watch has unlocked. On the reading side: a
//! [`ResponseCache`] that makes every AI reading cost at most one backend
//! call per UTC day, and a [`UsageMeter`] for the free tier's daily
//! allowance.
//!
//! # Reading Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sutradhar::{ReadingKind, ReadingRequest, Sutradhar};
//!
//! # fn make_backend() -> Arc<dyn sutradhar::ReadingBackend> { unimplemented!() }
//! #[tokio::main]
//! async fn main() -> sutradhar::Result<()> {
//!     let gateway = Sutradhar::builder()
//!         .backend(make_backend())
//!         .build()?;
//!
//!     let request = ReadingRequest::new(
//!         ReadingKind::Numerology,
//!         serde_json::json!({ "name": "Asha", "birth_date": "1994-03-21" }),
//!     );
//!
//!     // First call hits the backend; identical same-day calls are free.
//!     let reading = gateway.reading(&request).await?;
//!     println!("{reading}");
//!     Ok(())
//! }
//! ```
//!
//! # Reward Gate Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sutradhar::{GateAttempt, Sutradhar};
//!
//! # fn make_capability() -> Arc<dyn sutradhar::AdCapability> { unimplemented!() }
//! #[tokio::main]
//! async fn main() -> sutradhar::Result<()> {
//!     let gateway = Sutradhar::builder()
//!         .capability(make_capability())
//!         .build()?;
//!
//!     match gateway.reward_gate().await {
//!         GateAttempt::Granted(_) => {
//!             // Earned (or a fallback was shown): open the feature window.
//!             gateway.unlocks().unlock("tarot");
//!         }
//!         GateAttempt::NotEarned => println!("watch the full ad to unlock"),
//!         GateAttempt::Unavailable { escape, .. } => {
//!             // No inventory on this device; let the user through anyway.
//!             let _ = escape.continue_anyway();
//!             gateway.unlocks().unlock("tarot");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod ads;
pub mod cache;
pub mod clock;
pub mod error;
pub mod gateway;
pub mod reading;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use error::{FailureKind, Result, SutradharError};
pub use gateway::{Sutradhar, SutradharBuilder};

pub use ads::{
    AdCapability, AdOrchestrator, AdProvider, AdTimings, AdUnlock, AdUnlockLedger, LoadRetryConfig,
    TimerAdConfig, TimerAdSchedule, TimerAdState, UnlockConfig, load_until_ready,
};
pub use cache::{CacheConfig, FileStore, KeyValueStore, MemoryStore, ResponseCache};
pub use clock::{Clock, SystemClock};
pub use reading::{ReadingBackend, ReadingService, UsageConfig, UsageMeter};

// Re-export all types
pub use types::{
    AdFormat, EscapeHatch, GateAttempt, GateOutcome, Language, ReadingKind, ReadingRequest,
    RewardOutcome, UnavailableReason,
};
