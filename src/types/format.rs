//! Ad format identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The ad formats the native SDK can serve.
///
/// `Interstitial` and `Rewarded` are full-screen and consumed by
/// presentation; `Banner` and `Native` are persistent surfaces with an
/// extra hide/remove lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdFormat {
    Interstitial,
    Rewarded,
    Banner,
    Native,
}

impl AdFormat {
    /// All formats, in state-array order.
    pub const ALL: [AdFormat; 4] = [
        AdFormat::Interstitial,
        AdFormat::Rewarded,
        AdFormat::Banner,
        AdFormat::Native,
    ];

    /// Canonical lowercase name (metric label and log field value).
    pub fn as_str(&self) -> &'static str {
        match self {
            AdFormat::Interstitial => "interstitial",
            AdFormat::Rewarded => "rewarded",
            AdFormat::Banner => "banner",
            AdFormat::Native => "native",
        }
    }

    /// Index into per-format state arrays.
    pub(crate) fn index(self) -> usize {
        match self {
            AdFormat::Interstitial => 0,
            AdFormat::Rewarded => 1,
            AdFormat::Banner => 2,
            AdFormat::Native => 3,
        }
    }
}

impl fmt::Display for AdFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
