//! Pain taxonomy: canonical categories and free-text normalization.
//!
//! Characteristics carry comma-separated pain tags typed by hand over years of
//! spreadsheet edits, in two vocabularies and with many typos. Everything is
//! folded into the four [`PainCategory`] values here; tokens that match no rule
//! are dropped and reported, never surfaced as errors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{LOG_PAIN_DROPPED, PAIN_JOINER, PAIN_SEPARATOR};

/// Canonical pain categories, in canonical serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PainCategory {
    Ease,
    Security,
    Savings,
    Speed,
}

impl PainCategory {
    pub const ALL: [Self; 4] = [Self::Ease, Self::Security, Self::Savings, Self::Speed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ease => "Ease",
            Self::Security => "Security",
            Self::Savings => "Savings",
            Self::Speed => "Speed",
        }
    }

    /// Single-character badge used in narrow table columns.
    #[must_use]
    pub const fn short_label(self) -> &'static str {
        match self {
            Self::Ease => "E",
            Self::Security => "S",
            Self::Savings => "$",
            Self::Speed => "F",
        }
    }

    /// Tooltip text explaining the category to operators.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ease => "Simpler processes and less day-to-day complexity",
            Self::Security => "Data protection and regulatory compliance",
            Self::Savings => "Lower costs and more efficient spending",
            Self::Speed => "Faster task completion and shorter lead times",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Ease => 0b0001,
            Self::Security => 0b0010,
            Self::Savings => 0b0100,
            Self::Speed => 0b1000,
        }
    }

    fn from_canonical(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == token)
    }
}

impl fmt::Display for PainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Known spellings, lowercased. Includes the legacy Russian vocabulary the
// source spreadsheets were authored in, and "timeline", the retired name of
// the speed category.
const SPELLINGS: &[(&str, PainCategory)] = &[
    ("ease", PainCategory::Ease),
    ("easy", PainCategory::Ease),
    ("eas", PainCategory::Ease),
    ("simplicity", PainCategory::Ease),
    ("легкость", PainCategory::Ease),
    ("лёгкость", PainCategory::Ease),
    ("лекость", PainCategory::Ease),
    ("security", PainCategory::Security),
    ("secuirty", PainCategory::Security),
    ("securty", PainCategory::Security),
    ("sec", PainCategory::Security),
    ("безопасность", PainCategory::Security),
    ("безопастность", PainCategory::Security),
    ("безопасностьасность", PainCategory::Security),
    ("безоп", PainCategory::Security),
    ("savings", PainCategory::Savings),
    ("saving", PainCategory::Savings),
    ("econ", PainCategory::Savings),
    ("economy", PainCategory::Savings),
    ("экономия", PainCategory::Savings),
    ("эконом", PainCategory::Savings),
    ("speed", PainCategory::Speed),
    ("timeline", PainCategory::Speed),
    ("timelines", PainCategory::Speed),
    ("скорость", PainCategory::Speed),
    ("сроки", PainCategory::Speed),
];

// Last-resort stems, checked as substrings in declaration order.
const STEMS: &[(&str, PainCategory)] = &[
    ("легк", PainCategory::Ease),
    ("лёгк", PainCategory::Ease),
    ("secur", PainCategory::Security),
    ("безоп", PainCategory::Security),
    ("econom", PainCategory::Savings),
    ("эконом", PainCategory::Savings),
    ("скор", PainCategory::Speed),
    ("срок", PainCategory::Speed),
];

/// Normalize a single free-text token into a canonical category.
///
/// Exact canonical names are returned unchanged; otherwise the spelling table
/// and then the stem table are consulted case-insensitively. Unknown tokens
/// yield `None`.
#[must_use]
pub fn normalize(token: &str) -> Option<PainCategory> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(category) = PainCategory::from_canonical(trimmed) {
        return Some(category);
    }
    let lower = trimmed.to_lowercase();
    SPELLINGS
        .iter()
        .find(|(spelling, _)| *spelling == lower)
        .or_else(|| STEMS.iter().find(|(stem, _)| lower.contains(stem)))
        .map(|(_, category)| *category)
}

/// Deduplicated set of pain categories with no internal order.
///
/// Iteration and serialization always follow [`PainCategory::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<PainCategory>", from = "Vec<PainCategory>")]
pub struct PainSet(u8);

impl PainSet {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn contains(self, category: PainCategory) -> bool {
        self.0 & category.bit() != 0
    }

    pub fn insert(&mut self, category: PainCategory) {
        self.0 |= category.bit();
    }

    pub fn remove(&mut self, category: PainCategory) {
        self.0 &= !category.bit();
    }

    /// Flip membership of `category`, returning whether it is now present.
    pub fn toggle(&mut self, category: PainCategory) -> bool {
        self.0 ^= category.bit();
        self.contains(category)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn iter(self) -> impl Iterator<Item = PainCategory> {
        PainCategory::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }
}

impl FromIterator<PainCategory> for PainSet {
    fn from_iter<I: IntoIterator<Item = PainCategory>>(iter: I) -> Self {
        let mut set = Self::empty();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

impl From<Vec<PainCategory>> for PainSet {
    fn from(categories: Vec<PainCategory>) -> Self {
        categories.into_iter().collect()
    }
}

impl From<PainSet> for Vec<PainCategory> {
    fn from(set: PainSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for PainSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_display_string(*self))
    }
}

/// Result of parsing a raw pain list, including the tokens that were dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PainParse {
    pub set: PainSet,
    pub dropped: Vec<String>,
}

/// Parse a raw comma list, keeping track of tokens that matched no rule.
#[must_use]
pub fn normalize_with_report(raw: &str) -> PainParse {
    let mut parse = PainParse::default();
    for token in raw.split(PAIN_SEPARATOR) {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        match normalize(trimmed) {
            Some(category) => parse.set.insert(category),
            None => parse.dropped.push(trimmed.to_string()),
        }
    }
    parse
}

/// Parse a raw comma list into a canonical set, silently dropping unknown tokens.
#[must_use]
pub fn to_set(raw: &str) -> PainSet {
    normalize_with_report(raw).set
}

/// Parse a raw comma list and emit a warning for every dropped token.
///
/// Used on the edit path, where a dropped token would otherwise vanish from
/// storage without anyone noticing.
#[must_use]
pub fn to_set_warning(raw: &str, context: &str) -> PainSet {
    let parse = normalize_with_report(raw);
    for token in &parse.dropped {
        log::warn!("{LOG_PAIN_DROPPED}: unrecognized pain token {token:?} in {context}");
    }
    parse.set
}

/// Canonical serialization: categories joined with `", "` in declaration order.
#[must_use]
pub fn to_display_string(set: PainSet) -> String {
    set.iter()
        .map(PainCategory::as_str)
        .collect::<Vec<_>>()
        .join(PAIN_JOINER)
}

/// Canonical form of a raw pain list, the value compared when detecting edits.
#[must_use]
pub fn canonicalize(raw: &str) -> String {
    to_display_string(to_set(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_pass_through() {
        for category in PainCategory::ALL {
            assert_eq!(normalize(category.as_str()), Some(category));
            assert_eq!(normalize(&format!("  {category} ")), Some(category));
        }
    }

    #[test]
    fn every_known_spelling_maps_to_its_category() {
        for (spelling, expected) in SPELLINGS {
            assert_eq!(normalize(spelling), Some(*expected), "spelling {spelling}");
            let upper = spelling.to_uppercase();
            assert_eq!(normalize(&upper), Some(*expected), "spelling {upper}");
        }
    }

    #[test]
    fn legacy_timeline_maps_to_speed() {
        assert_eq!(normalize("Timeline"), Some(PainCategory::Speed));
        assert_eq!(normalize("Сроки"), Some(PainCategory::Speed));
    }

    #[test]
    fn stems_catch_unlisted_variants() {
        assert_eq!(normalize("Secure storage"), Some(PainCategory::Security));
        assert_eq!(normalize("Экономичность"), Some(PainCategory::Savings));
        assert_eq!(normalize("Скоростной"), Some(PainCategory::Speed));
    }

    #[test]
    fn unknown_tokens_are_dropped() {
        assert_eq!(normalize("Comfort"), None);
        assert_eq!(normalize("   "), None);
        let parse = normalize_with_report("Ease, Comfort, , Prestige");
        assert_eq!(parse.set, [PainCategory::Ease].into_iter().collect());
        assert_eq!(parse.dropped, vec!["Comfort".to_string(), "Prestige".to_string()]);
    }

    #[test]
    fn sets_deduplicate_and_serialize_in_declaration_order() {
        let set = to_set("Speed, Лёгкость, speed, Безоп, Ease");
        assert_eq!(set.len(), 3);
        assert_eq!(to_display_string(set), "Ease, Security, Speed");
    }

    #[test]
    fn serialization_is_idempotent() {
        let raw = "Сроки,Безопасностьасность, Comfort, Эконом";
        let once = canonicalize(raw);
        assert_eq!(once, "Security, Savings, Speed");
        assert_eq!(canonicalize(&once), once);
    }

    #[test]
    fn toggle_flips_membership() {
        let mut set = PainSet::empty();
        assert!(set.toggle(PainCategory::Savings));
        assert!(set.contains(PainCategory::Savings));
        assert!(!set.toggle(PainCategory::Savings));
        assert!(set.is_empty());
    }

    #[test]
    fn intersection_is_any_match() {
        let row = to_set("Ease, Speed");
        assert!(row.intersects(to_set("Speed, Security")));
        assert!(!row.intersects(to_set("Security")));
        assert!(!row.intersects(PainSet::empty()));
    }

    #[test]
    fn set_serializes_as_ordered_list() {
        let set = to_set("Speed, Ease");
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["Ease","Speed"]"#);
        let back: PainSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
