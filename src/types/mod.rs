//! Public types for the Sutradhar API.

mod format;
mod gate;
mod reading;

pub use format::AdFormat;
pub use gate::{EscapeHatch, GateAttempt, GateOutcome, RewardOutcome, UnavailableReason};
pub use reading::{Language, ReadingKind, ReadingRequest};
