//! Telemetry metric name constants.
//!
//! Centralised metric names for sutradhar operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `sutradhar_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `format` — ad format ("interstitial", "rewarded", "banner", "native")
//! - `feature` — cache namespace, usually a reading kind (e.g. "numerology")
//! - `backend` — reading backend name
//! - `status` — outcome: "ok" or "error"

/// Total native ad load attempts that reached the SDK.
///
/// Labels: `format`, `status` ("ok" | "error").
pub const AD_LOADS_TOTAL: &str = "sutradhar_ad_loads_total";

/// Total native ad show attempts.
///
/// Labels: `format`, `status` ("ok" | "error").
pub const AD_SHOWS_TOTAL: &str = "sutradhar_ad_shows_total";

/// Total load retries while the SDK initialises (not counting the
/// initial attempt).
///
/// Labels: `format`.
pub const AD_LOAD_RETRIES_TOTAL: &str = "sutradhar_ad_load_retries_total";

/// Reward gate outcomes.
///
/// Labels: `outcome` ("earned" | "fallback" | "not_earned" |
/// "not_supported" | "no_fill" | "deadline_exceeded" | "failed").
pub const GATE_OUTCOMES_TOTAL: &str = "sutradhar_gate_outcomes_total";

/// Post-action interstitial outcomes.
///
/// Labels: `status` ("shown" | "skipped" | "failed").
pub const POST_ACTION_ADS_TOTAL: &str = "sutradhar_post_action_ads_total";

/// Total day-cache hits.
///
/// Labels: `feature`.
pub const CACHE_HITS_TOTAL: &str = "sutradhar_cache_hits_total";

/// Total day-cache misses.
///
/// Labels: `feature`.
pub const CACHE_MISSES_TOTAL: &str = "sutradhar_cache_misses_total";

/// Total cache persistence failures (absorbed, never surfaced).
pub const CACHE_WRITE_FAILURES_TOTAL: &str = "sutradhar_cache_write_failures_total";

/// Total reading backend requests.
///
/// Labels: `backend`, `feature`, `status` ("ok" | "error").
pub const BACKEND_REQUESTS_TOTAL: &str = "sutradhar_backend_requests_total";

/// Reading backend request duration in seconds.
///
/// Labels: `backend`, `feature`.
pub const BACKEND_REQUEST_DURATION_SECONDS: &str = "sutradhar_backend_request_duration_seconds";
