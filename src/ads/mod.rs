//! Ad capability, provider, and presentation protocols.
//!
//! [`AdCapability`] is the seam to a native ad SDK; [`AdProvider`] wraps a
//! possibly-absent capability and tracks per-format load state;
//! [`AdOrchestrator`] runs the reward gate and post-action protocols on
//! top; [`TimerAdSchedule`] decides when the usage-timer interstitial is
//! due; [`AdUnlockLedger`] tracks the feature windows a watched ad has
//! opened.

mod capability;
mod orchestrator;
mod provider;
mod retry;
mod timer;
mod unlock;

pub use capability::AdCapability;
pub use orchestrator::{
    AdOrchestrator, AdTimings, DEFAULT_GATE_DEADLINE, DEFAULT_POST_ACTION_DELAY,
    DEFAULT_POST_ACTION_SETTLE, DEFAULT_READY_RECHECK,
};
pub use provider::{AdProvider, DEFAULT_SHOW_SETTLE};
pub use retry::{DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS, LoadRetryConfig, load_until_ready};
pub use timer::{
    DEFAULT_MAX_INTERVAL, DEFAULT_MIN_INTERVAL, DEFAULT_TIMER_STORAGE_KEY, TimerAdConfig,
    TimerAdSchedule, TimerAdState,
};
pub use unlock::{
    AdUnlock, AdUnlockLedger, DEFAULT_UNLOCK_DURATION, DEFAULT_UNLOCK_STORAGE_KEY, UnlockConfig,
};
