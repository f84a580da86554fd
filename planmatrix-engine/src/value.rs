//! Cell value codec.
//!
//! Stored cell strings mix display text with an optional embedded magnitude.
//! Two encodings coexist in the data, `"<text> | <n>"` and `"<text> (<n>%)"`,
//! alongside bare numbers and the `-` / `+` sentinels. [`decode`] tries them
//! in that order and never fails.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::constants::{CHECK_GLYPH, CHECK_VALUE, EMPTY_GLYPH, EMPTY_VALUE};
use crate::numbers::parse_magnitude;

fn trailing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?s)(.+?)\s*\|\s*(\d+)\s*%?\s*$").expect("trailing-magnitude pattern")
    })
}

fn parenthetical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\(\s*(\d+)\s*%\s*\)\s*$").expect("parenthetical pattern"))
}

fn first_digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("digit-run pattern"))
}

/// How a decoded cell should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// `-` or blank: nothing to show.
    Empty,
    /// `+`: boolean true, shown as a checkmark.
    Check,
    Text,
}

/// A stored cell string split into display text and optional magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedValue {
    pub kind: ValueKind,
    pub display_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<u32>,
}

impl DecodedValue {
    fn sentinel(kind: ValueKind) -> Self {
        let glyph = match kind {
            ValueKind::Check => CHECK_GLYPH,
            ValueKind::Empty | ValueKind::Text => EMPTY_GLYPH,
        };
        Self {
            kind,
            display_text: glyph.to_string(),
            magnitude: None,
        }
    }

    fn text(display_text: impl Into<String>, magnitude: Option<u32>) -> Self {
        Self {
            kind: ValueKind::Text,
            display_text: display_text.into(),
            magnitude,
        }
    }

    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self.kind, ValueKind::Empty | ValueKind::Check)
    }
}

/// Whether `raw` is one of the sentinels that never carry a magnitude.
#[must_use]
pub fn is_sentinel(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == EMPTY_VALUE || trimmed == CHECK_VALUE
}

/// Decode a stored cell string.
#[must_use]
pub fn decode(raw: &str) -> DecodedValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == EMPTY_VALUE {
        return DecodedValue::sentinel(ValueKind::Empty);
    }
    if trimmed == CHECK_VALUE {
        return DecodedValue::sentinel(ValueKind::Check);
    }

    if let Some((text, magnitude)) = decode_trailing(trimmed) {
        return DecodedValue::text(text, Some(magnitude));
    }

    if let Some((text, magnitude)) = decode_parenthetical(trimmed) {
        return DecodedValue::text(text, Some(magnitude));
    }

    if let Some(magnitude) = parse_magnitude(trimmed) {
        return DecodedValue::text(trimmed, Some(magnitude));
    }

    DecodedValue::text(raw, None)
}

/// Match only the trailing `"<text> | <n>"` form.
#[must_use]
pub fn decode_trailing(raw: &str) -> Option<(String, u32)> {
    let caps = trailing_re().captures(raw.trim())?;
    let magnitude = parse_magnitude(&caps[2])?;
    Some((caps[1].trim().to_string(), magnitude))
}

/// Match only the trailing `"<text> (<n>%)"` form.
#[must_use]
pub fn decode_parenthetical(raw: &str) -> Option<(String, u32)> {
    let trimmed = raw.trim();
    let caps = parenthetical_re().captures(trimmed)?;
    let magnitude = parse_magnitude(&caps[1])?;
    let stripped = parenthetical_re().replace(trimmed, "");
    Some((stripped.trim().to_string(), magnitude))
}

/// Magnitude written next to the text as a marker, ignoring bare numbers.
#[must_use]
pub fn marked_magnitude(raw: &str) -> Option<u32> {
    decode_trailing(raw)
        .or_else(|| decode_parenthetical(raw))
        .map(|(_, magnitude)| magnitude)
}

/// Encode text and magnitude using the trailing `" | "` form.
#[must_use]
pub fn encode(text: &str, magnitude: u32) -> String {
    format!("{} | {magnitude}", text.trim())
}

/// Remove encoding artifacts for display, without interpreting the magnitude.
#[must_use]
pub fn strip_markers(raw: &str) -> String {
    let decoded = decode(raw);
    match decoded.kind {
        ValueKind::Text => decoded.display_text,
        ValueKind::Empty | ValueKind::Check => raw.trim().to_string(),
    }
}

/// First run of digits anywhere in `raw`, if any.
#[must_use]
pub fn first_number(raw: &str) -> Option<u32> {
    first_digits_re()
        .find(raw)
        .and_then(|m| parse_magnitude(m.as_str()))
}

/// Magnitude used for progress scaling, read from a raw stored value.
///
/// Sentinels yield nothing; encoded and bare numbers yield their magnitude;
/// free text falls back to its first digit run.
#[must_use]
pub fn progress_magnitude(raw: &str) -> Option<u32> {
    if is_sentinel(raw) {
        return None;
    }
    decode(raw).magnitude.or_else(|| first_number(raw))
}
