//! Section and pain-category filtering.
//!
//! Within one dimension a row matches when its pains intersect the selection.
//! Across dimensions the rule is OR when both are active, and the single
//! active dimension otherwise.

use serde::{Deserialize, Serialize};

use crate::matrix::Row;
use crate::pain::{PainCategory, PainSet};

/// Transient, session-scoped filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub selected_section: Option<String>,
    #[serde(default)]
    pub personal_categories: PainSet,
    #[serde(default)]
    pub corporate_categories: PainSet,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.selected_section = Some(section.into());
        self
    }

    #[must_use]
    pub fn with_personal<I: IntoIterator<Item = PainCategory>>(mut self, categories: I) -> Self {
        self.personal_categories = categories.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_corporate<I: IntoIterator<Item = PainCategory>>(mut self, categories: I) -> Self {
        self.corporate_categories = categories.into_iter().collect();
        self
    }

    /// Select a section, or clear the section filter with `None`.
    pub fn select_section(&mut self, section: Option<String>) {
        self.selected_section = section;
    }

    /// Returns whether the category is selected after the toggle.
    pub fn toggle_personal(&mut self, category: PainCategory) -> bool {
        self.personal_categories.toggle(category)
    }

    /// Returns whether the category is selected after the toggle.
    pub fn toggle_corporate(&mut self, category: PainCategory) -> bool {
        self.corporate_categories.toggle(category)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of active selections, counting the section filter as one.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.personal_categories.len()
            + self.corporate_categories.len()
            + usize::from(self.selected_section.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Whether `row` passes the section filter.
    #[must_use]
    pub fn matches_section(&self, row: &Row) -> bool {
        self.selected_section
            .as_deref()
            .is_none_or(|section| row.section == section)
    }

    /// Whether `row` passes the pain-category filters.
    #[must_use]
    pub fn matches_categories(&self, row: &Row) -> bool {
        let has_personal = !self.personal_categories.is_empty();
        let has_corporate = !self.corporate_categories.is_empty();
        if !has_personal && !has_corporate {
            return true;
        }

        let matches_personal =
            has_personal && row.personal_set().intersects(self.personal_categories);
        let matches_corporate =
            has_corporate && row.corporate_set().intersects(self.corporate_categories);

        match (has_personal, has_corporate) {
            (true, true) => matches_personal || matches_corporate,
            (true, false) => matches_personal,
            (false, true) => matches_corporate,
            (false, false) => true,
        }
    }

    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.matches_section(row) && self.matches_categories(row)
    }
}

/// Keep only the rows matching `state`, preserving their order.
#[must_use]
pub fn filter_rows(rows: Vec<Row>, state: &FilterState) -> Vec<Row> {
    rows.into_iter().filter(|row| state.matches(row)).collect()
}
