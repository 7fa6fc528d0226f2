//! Cache key derivation.
//!
//! Keys are `feature:suffix`. The suffix comes from a canonical
//! serialization of the input: [`serde_json::Value`] objects keep their
//! keys sorted at every nesting level, so `{a, b}` and `{b, a}` derive the
//! same key. Short serializations become a sanitized slug (readable when
//! inspecting storage); long ones are hashed so keys stay bounded.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Serializations longer than this are hashed instead of slugged.
pub const LONG_INPUT_THRESHOLD: usize = 200;

/// Maximum slug length for short inputs.
pub const SLUG_MAX_LEN: usize = 80;

/// Bytes of the SHA-256 digest kept for long inputs (16 hex chars).
const HASH_PREFIX_BYTES: usize = 8;

/// Derive the cache key for a feature and input.
///
/// String inputs are taken verbatim; everything else is serialized through
/// its `Value` form. The feature joins with `:`, which survives in neither
/// slugs nor hex digests, so distinct features can never collide.
pub(crate) fn derive_key(feature: &str, input: &Value) -> String {
    let serialized = match input {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("{feature}:{}", suffix_for(&serialized))
}

fn suffix_for(serialized: &str) -> String {
    if serialized.chars().count() > LONG_INPUT_THRESHOLD {
        let digest = Sha256::digest(serialized.as_bytes());
        digest
            .iter()
            .take(HASH_PREFIX_BYTES)
            .map(|b| format!("{b:02x}"))
            .collect()
    } else {
        serialized
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .take(SLUG_MAX_LEN)
            .collect()
    }
}
