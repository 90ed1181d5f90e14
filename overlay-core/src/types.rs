//! Domain types for overlay documents.
//!
//! Entry fields are borrowed straight out of the document text; nothing here
//! owns or re-encodes field content.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed entry key (the stable identifier of an Entry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryKey(pub String);

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntryKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntryKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq<&str> for EntryKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for EntryKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Fields and tag names
// ---------------------------------------------------------------------------

/// The fields an Entry may carry, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Key,
    SourceText,
    Baseline,
    Correction,
}

impl Field {
    /// Every field, in the order blocks are written.
    pub const ALL: [Field; 4] = [
        Field::Key,
        Field::SourceText,
        Field::Baseline,
        Field::Correction,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Key => write!(f, "key"),
            Field::SourceText => write!(f, "source_text"),
            Field::Baseline => write!(f, "baseline_translation"),
            Field::Correction => write!(f, "correction"),
        }
    }
}

/// Literal tag names used by a document family.
///
/// Defaults match the Japanese localization layout: `zType` keys, `en-US`
/// source text, `ja` baseline and `fixja` corrections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagSchema {
    pub entry: String,
    pub key: String,
    pub source_text: String,
    pub baseline: String,
    pub correction: String,
}

impl Default for TagSchema {
    fn default() -> Self {
        Self {
            entry: "Entry".to_string(),
            key: "zType".to_string(),
            source_text: "en-US".to_string(),
            baseline: "ja".to_string(),
            correction: "fixja".to_string(),
        }
    }
}

impl TagSchema {
    /// Tag name for `field`.
    pub fn tag(&self, field: Field) -> &str {
        match field {
            Field::Key => &self.key,
            Field::SourceText => &self.source_text,
            Field::Baseline => &self.baseline,
            Field::Correction => &self.correction,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// Field values of a single Entry record.
///
/// Values are opaque spans of the original text; nested markup inside them is
/// never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryFields<'a> {
    pub key: &'a str,
    pub source_text: Option<&'a str>,
    pub baseline: Option<&'a str>,
    pub correction: Option<&'a str>,
}

impl<'a> EntryFields<'a> {
    /// Value for `field`, if present.
    pub fn get(&self, field: Field) -> Option<&'a str> {
        match field {
            Field::Key => Some(self.key),
            Field::SourceText => self.source_text,
            Field::Baseline => self.baseline,
            Field::Correction => self.correction,
        }
    }

    /// The same entry with `correction` seeded from the baseline (empty when
    /// the baseline is absent).
    pub fn seeded(self) -> Self {
        Self {
            correction: Some(self.baseline.unwrap_or("")),
            ..self
        }
    }

    /// The same entry without a `correction` field.
    pub fn without_correction(self) -> Self {
        Self {
            correction: None,
            ..self
        }
    }

    /// `true` when both baseline and correction exist and differ after
    /// trimming surrounding whitespace.
    pub fn has_pending_correction(&self) -> bool {
        match (self.baseline, self.correction) {
            (Some(baseline), Some(correction)) => baseline.trim() != correction.trim(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
