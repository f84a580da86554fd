//! Plan data as supplied by storage: records, plans and snapshots.

use serde::{Deserialize, Serialize};

/// One characteristic of one plan, as supplied by the storage collaborator.
///
/// Legacy exports used Russian field names; they are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CharacteristicRecord {
    #[serde(alias = "раздел")]
    pub section: String,
    #[serde(alias = "характеристика")]
    pub characteristic: String,
    #[serde(default, alias = "описание")]
    pub description: String,
    #[serde(default, alias = "личные_боли")]
    pub personal_pain: String,
    #[serde(default, alias = "корпоративные_боли")]
    pub corporate_pain: String,
    #[serde(default, alias = "возражения")]
    pub objections: String,
    #[serde(default, alias = "сомнения")]
    pub doubts: String,
    #[serde(default, alias = "вопросы")]
    pub questions: String,
    #[serde(default)]
    pub is_section_header: bool,
    #[serde(default, alias = "значение", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<String>,
}

impl CharacteristicRecord {
    /// Create a bare record with no metadata and no value.
    #[must_use]
    pub fn new(section: impl Into<String>, characteristic: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            characteristic: characteristic.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_raw_value(mut self, raw_value: impl Into<String>) -> Self {
        self.raw_value = Some(raw_value.into());
        self
    }

    #[must_use]
    pub fn with_pains(mut self, personal: impl Into<String>, corporate: impl Into<String>) -> Self {
        self.personal_pain = personal.into();
        self.corporate_pain = corporate.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn as_header(mut self) -> Self {
        self.is_section_header = true;
        self
    }

    /// Whether this record belongs to `(section, characteristic)`.
    #[must_use]
    pub fn is(&self, section: &str, characteristic: &str) -> bool {
        self.section == section && self.characteristic == characteristic
    }
}

/// A comparable offering and its ordered characteristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(alias = "название")]
    pub name: String,
    #[serde(default, alias = "цена", skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, alias = "характеристики")]
    pub characteristics: Vec<CharacteristicRecord>,
}

impl Plan {
    #[must_use]
    pub fn new(name: impl Into<String>, characteristics: Vec<CharacteristicRecord>) -> Self {
        Self {
            name: name.into(),
            price: None,
            characteristics,
        }
    }

    #[must_use]
    pub fn find(&self, section: &str, characteristic: &str) -> Option<&CharacteristicRecord> {
        self.characteristics
            .iter()
            .find(|record| record.is(section, characteristic))
    }

    pub fn find_mut(
        &mut self,
        section: &str,
        characteristic: &str,
    ) -> Option<&mut CharacteristicRecord> {
        self.characteristics
            .iter_mut()
            .find(|record| record.is(section, characteristic))
    }
}

/// Full snapshot of the plans, as returned by `list_plans`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlanSnapshot {
    pub plans: Vec<Plan>,
}

impl PlanSnapshot {
    #[must_use]
    pub const fn empty() -> Self {
        Self { plans: Vec::new() }
    }

    /// Load a snapshot from a JSON string.
    ///
    /// Accepts either `{"plans": [...]}` or a bare array of plans.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into plan data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Wrapped(PlanSnapshot),
            Bare(Vec<Plan>),
        }

        Ok(match serde_json::from_str::<Shape>(json)? {
            Shape::Wrapped(snapshot) => snapshot,
            Shape::Bare(plans) => Self { plans },
        })
    }

    #[must_use]
    pub fn plan_names(&self) -> Vec<String> {
        self.plans.iter().map(|plan| plan.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_from_wrapped_json() {
        let json = r#"{
            "plans": [
                {
                    "name": "Basic",
                    "price": "220000",
                    "characteristics": [
                        {
                            "section": "Pricing",
                            "characteristic": "Cost",
                            "is_section_header": true,
                            "value": "From 220k | 100"
                        }
                    ]
                }
            ]
        }"#;

        let snapshot = PlanSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.plans.len(), 1);
        let record = &snapshot.plans[0].characteristics[0];
        assert!(record.is_section_header);
        assert_eq!(record.value.as_deref(), Some("From 220k | 100"));
        assert_eq!(record.raw_value, None);
        assert_eq!(record.personal_pain, "");
    }

    #[test]
    fn snapshot_accepts_legacy_field_names() {
        let json = r#"[
            {
                "название": "Стандарт",
                "характеристики": [
                    {
                        "раздел": "Сроки",
                        "характеристика": "Срок подготовки",
                        "значение": "14",
                        "личные_боли": "Лёгкость, Сроки",
                        "raw_value": "14"
                    }
                ]
            }
        ]"#;

        let snapshot = PlanSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.plan_names(), vec!["Стандарт".to_string()]);
        let record = &snapshot.plans[0].characteristics[0];
        assert_eq!(record.section, "Сроки");
        assert_eq!(record.personal_pain, "Лёгкость, Сроки");
        assert_eq!(record.raw_value.as_deref(), Some("14"));
    }

    #[test]
    fn plan_find_matches_identity() {
        let plan = Plan::new(
            "Basic",
            vec![
                CharacteristicRecord::new("A", "x").with_value("1"),
                CharacteristicRecord::new("B", "x").with_value("2"),
            ],
        );
        assert_eq!(plan.find("B", "x").and_then(|r| r.value.as_deref()), Some("2"));
        assert!(plan.find("C", "x").is_none());
    }
}
