//! Aggregation of per-plan characteristic lists into cross-plan rows.
//!
//! Rows are keyed by `(section, characteristic)`. Metadata is taken from the
//! first record seen in plan-list order and never merged; values are collected
//! for every plan, defaulting to `-`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

use crate::config::StickyNames;
use crate::constants::EMPTY_VALUE;
use crate::data::{CharacteristicRecord, Plan};
use crate::pain::{self, PainSet};

/// Identity of a row across the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey {
    pub section: String,
    pub characteristic: String,
}

impl RowKey {
    #[must_use]
    pub fn new(section: impl Into<String>, characteristic: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            characteristic: characteristic.into(),
        }
    }

    fn of(record: &CharacteristicRecord) -> Self {
        Self::new(record.section.clone(), record.characteristic.clone())
    }
}

/// The value a single plan holds for a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanValue {
    pub plan: String,
    pub value: String,
    pub raw_value: String,
}

impl PlanValue {
    fn missing(plan: &str) -> Self {
        Self {
            plan: plan.to_string(),
            value: EMPTY_VALUE.to_string(),
            raw_value: EMPTY_VALUE.to_string(),
        }
    }
}

/// One aggregated `(section, characteristic)` entry spanning all plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub section: String,
    pub characteristic: String,
    pub description: String,
    pub personal_pain: String,
    pub corporate_pain: String,
    pub objections: String,
    pub doubts: String,
    pub questions: String,
    pub is_section_header: bool,
    /// One entry per plan, in plan-list order.
    pub values: Vec<PlanValue>,
}

impl Row {
    fn seed(record: &CharacteristicRecord, plan_names: &[&str]) -> Self {
        Self {
            section: record.section.clone(),
            characteristic: record.characteristic.clone(),
            description: record.description.clone(),
            personal_pain: record.personal_pain.clone(),
            corporate_pain: record.corporate_pain.clone(),
            objections: record.objections.clone(),
            doubts: record.doubts.clone(),
            questions: record.questions.clone(),
            is_section_header: record.is_section_header,
            values: plan_names.iter().map(|name| PlanValue::missing(name)).collect(),
        }
    }

    #[must_use]
    pub fn key(&self) -> RowKey {
        RowKey::new(self.section.clone(), self.characteristic.clone())
    }

    /// Display value for `plan`, `-` if the plan lacks the record.
    #[must_use]
    pub fn value_for(&self, plan: &str) -> &str {
        self.values
            .iter()
            .find(|v| v.plan == plan)
            .map_or(EMPTY_VALUE, |v| v.value.as_str())
    }

    /// Raw value for `plan`, `-` if the plan lacks the record.
    #[must_use]
    pub fn raw_value_for(&self, plan: &str) -> &str {
        self.values
            .iter()
            .find(|v| v.plan == plan)
            .map_or(EMPTY_VALUE, |v| v.raw_value.as_str())
    }

    #[must_use]
    pub fn personal_set(&self) -> PainSet {
        pain::to_set(&self.personal_pain)
    }

    #[must_use]
    pub fn corporate_set(&self) -> PainSet {
        pain::to_set(&self.corporate_pain)
    }

    fn set_plan_value(&mut self, plan: &str, record: &CharacteristicRecord) {
        let value = non_blank(record.value.as_deref()).unwrap_or(EMPTY_VALUE);
        let raw_value = non_blank(record.raw_value.as_deref())
            .or_else(|| non_blank(record.value.as_deref()))
            .unwrap_or(EMPTY_VALUE);
        let entry = PlanValue {
            plan: plan.to_string(),
            value: value.to_string(),
            raw_value: raw_value.to_string(),
        };
        match self.values.iter_mut().find(|v| v.plan == plan) {
            Some(slot) => *slot = entry,
            None => self.values.push(entry),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Merge per-plan characteristic lists into rows, in first-encounter order.
#[must_use]
pub fn aggregate(plans: &[Plan]) -> Vec<Row> {
    let plan_names: Vec<&str> = plans.iter().map(|plan| plan.name.as_str()).collect();
    let mut index: HashMap<RowKey, usize> = HashMap::new();
    let mut rows: Vec<Row> = Vec::new();

    for plan in plans {
        for record in &plan.characteristics {
            let slot = *index.entry(RowKey::of(record)).or_insert_with(|| {
                rows.push(Row::seed(record, &plan_names));
                rows.len() - 1
            });
            rows[slot].set_plan_value(&plan.name, record);
        }
    }

    rows
}

/// Result of pulling the pinned header rows out of the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StickySplit {
    /// Primary sticky row first, then secondary; at most one of each.
    pub sticky: SmallVec<[Row; 2]>,
    pub rest: Vec<Row>,
}

/// Whether `row` is one of the pinned header rows.
#[must_use]
pub fn is_sticky(row: &Row, names: &StickyNames) -> bool {
    row.is_section_header && names.contains(&row.characteristic)
}

/// Split pinned header rows from the rest.
///
/// The first row per reserved name is kept; later duplicates are dropped so
/// that a reserved header never shows up among the main rows.
#[must_use]
pub fn extract_sticky(rows: Vec<Row>, names: &StickyNames) -> StickySplit {
    let mut seen: HashSet<String> = HashSet::new();
    let mut split = StickySplit::default();

    for row in rows {
        if !is_sticky(&row, names) {
            split.rest.push(row);
            continue;
        }
        if seen.insert(row.characteristic.clone()) {
            split.sticky.push(row);
        }
    }

    split
        .sticky
        .sort_by_key(|row| names.rank(&row.characteristic));
    split
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(name: &str, records: Vec<CharacteristicRecord>) -> Plan {
        Plan::new(name, records)
    }

    #[test]
    fn first_record_wins_metadata() {
        let plans = vec![
            plan(
                "Basic",
                vec![
                    CharacteristicRecord::new("Support", "Hotline")
                        .with_description("first")
                        .with_value("9-18"),
                ],
            ),
            plan(
                "Max",
                vec![
                    CharacteristicRecord::new("Support", "Hotline")
                        .with_description("second")
                        .with_value("24/7"),
                ],
            ),
        ];
        let rows = aggregate(&plans);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "first");
        assert_eq!(rows[0].value_for("Basic"), "9-18");
        assert_eq!(rows[0].value_for("Max"), "24/7");
    }

    #[test]
    fn missing_values_default_to_dash() {
        let plans = vec![
            plan("Basic", vec![CharacteristicRecord::new("A", "x").with_value("1")]),
            plan(
                "Max",
                vec![
                    CharacteristicRecord::new("A", "y").with_value(""),
                    CharacteristicRecord::new("A", "x"),
                ],
            ),
        ];
        let rows = aggregate(&plans);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].characteristic, "x");
        assert_eq!(rows[0].value_for("Max"), "-");
        assert_eq!(rows[1].value_for("Basic"), "-");
        assert_eq!(rows[1].value_for("Max"), "-");
        assert_eq!(rows[1].raw_value_for("Max"), "-");
        let order: Vec<&str> = rows[1].values.iter().map(|v| v.plan.as_str()).collect();
        assert_eq!(order, vec!["Basic", "Max"]);
    }

    #[test]
    fn raw_value_falls_back_to_value() {
        let plans = vec![plan(
            "Basic",
            vec![
                CharacteristicRecord::new("A", "x").with_value("From 10 | 40"),
                CharacteristicRecord::new("A", "y")
                    .with_value("10 days")
                    .with_raw_value("10"),
            ],
        )];
        let rows = aggregate(&plans);
        assert_eq!(rows[0].raw_value_for("Basic"), "From 10 | 40");
        assert_eq!(rows[1].raw_value_for("Basic"), "10");
        assert_eq!(rows[1].value_for("Basic"), "10 days");
    }

    #[test]
    fn identity_includes_section() {
        let plans = vec![plan(
            "Basic",
            vec![
                CharacteristicRecord::new("A", "x"),
                CharacteristicRecord::new("B", "x"),
            ],
        )];
        assert_eq!(aggregate(&plans).len(), 2);
    }

    #[test]
    fn sticky_rows_are_pulled_and_ordered() {
        let plans = vec![plan(
            "Basic",
            vec![
                CharacteristicRecord::new("Terms", "Timeline").as_header(),
                CharacteristicRecord::new("Terms", "Overview").as_header(),
                CharacteristicRecord::new("Pricing", "Cost").as_header(),
                CharacteristicRecord::new("Pricing", "Discounts"),
                CharacteristicRecord::new("Legacy", "Cost").as_header(),
                CharacteristicRecord::new("Other", "Timeline"),
            ],
        )];
        let split = extract_sticky(aggregate(&plans), &StickyNames::default());
        let sticky: Vec<&str> = split
            .sticky
            .iter()
            .map(|r| r.characteristic.as_str())
            .collect();
        assert_eq!(sticky, vec!["Cost", "Timeline"]);
        assert_eq!(split.sticky[0].section, "Pricing");

        let rest: Vec<(&str, &str)> = split
            .rest
            .iter()
            .map(|r| (r.section.as_str(), r.characteristic.as_str()))
            .collect();
        assert_eq!(
            rest,
            vec![
                ("Terms", "Overview"),
                ("Pricing", "Discounts"),
                ("Other", "Timeline"),
            ]
        );
    }
}
