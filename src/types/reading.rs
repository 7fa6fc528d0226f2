//! Reading request types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Well-known reading kinds with a `Custom` escape hatch.
///
/// The kind doubles as the cache feature namespace, so two kinds never
/// share cached responses. `Custom(String)` covers app features added
/// without a sutradhar release.
///
/// Serializes as a flat string (e.g. `"numerology"`) so it works both as a
/// JSON value and inside persisted cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadingKind {
    Numerology,
    Tarot,
    Palm,
    Face,
    Signature,
    Compatibility,
    /// App-specific reading kind not in the well-known set.
    Custom(String),
}

impl ReadingKind {
    /// Canonical string representation (the cache feature namespace).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Numerology => "numerology",
            Self::Tarot => "tarot",
            Self::Palm => "palm",
            Self::Face => "face",
            Self::Signature => "signature",
            Self::Compatibility => "compatibility",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "numerology" => Self::Numerology,
            "tarot" => Self::Tarot,
            "palm" => Self::Palm,
            "face" => Self::Face,
            "signature" => Self::Signature,
            "compatibility" => Self::Compatibility,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl Serialize for ReadingKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReadingKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        // FromStr is infallible for ReadingKind
        Ok(s.parse().unwrap())
    }
}

/// Reading output language.
///
/// Folded into the cache input, so the same question in two languages
/// caches separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Language {
    /// English (the app default).
    En,
    /// Hindi.
    Hi,
    /// Any other language tag the app passes through.
    Other(String),
}

impl Language {
    /// Canonical tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::En
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "en" => Self::En,
            "hi" => Self::Hi,
            other => Self::Other(other.to_string()),
        })
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        // FromStr is infallible for Language
        Ok(s.parse().unwrap())
    }
}

/// A reading request passed to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingRequest {
    /// Which reading to generate (also the cache namespace).
    pub kind: ReadingKind,
    /// Feature-specific input: name and birth date for numerology, a card
    /// spread for tarot, and so on. Serialized canonically for cache keys.
    pub input: Value,
    /// Output language.
    pub language: Language,
}

impl ReadingRequest {
    /// Request in the default language.
    pub fn new(kind: ReadingKind, input: Value) -> Self {
        Self {
            kind,
            input,
            language: Language::default(),
        }
    }

    /// Set the output language.
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}
