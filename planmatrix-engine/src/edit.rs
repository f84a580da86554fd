//! Edit drafts and change detection.
//!
//! A draft is seeded from a row, mutated by the caller, then diffed against
//! the row. Only fields whose canonical serialization changed produce an
//! [`UpdateRequest`], so an untouched draft issues no writes at all.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::StickyNames;
use crate::constants::DEFAULT_EDIT_MAGNITUDE;
use crate::matrix::{Row, is_sticky};
use crate::pain::{self, PainSet};
use crate::value;

/// Which field of a characteristic an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Description,
    Questions,
    PersonalPain,
    CorporatePain,
    /// Per-plan value; requires a plan name.
    Value,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Questions => "questions",
            Self::PersonalPain => "personal_pain",
            Self::CorporatePain => "corporate_pain",
            Self::Value => "value",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field write sent to the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub section: String,
    pub characteristic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    pub new_value: String,
    pub field_type: FieldType,
}

impl UpdateRequest {
    fn for_row(row: &Row, field_type: FieldType, new_value: String) -> Self {
        Self {
            section: row.section.clone(),
            characteristic: row.characteristic.clone(),
            plan_name: None,
            new_value,
            field_type,
        }
    }

    fn for_plan(row: &Row, plan: &str, new_value: String) -> Self {
        Self {
            plan_name: Some(plan.to_string()),
            ..Self::for_row(row, FieldType::Value, new_value)
        }
    }
}

/// Editable value of one plan.
///
/// `magnitude` is only set for pinned header rows. It is written back in the
/// trailing encoded form when the stored value already used that form or the
/// magnitude was edited; otherwise the text is stored as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftValue {
    pub plan: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<u32>,
    #[serde(default)]
    pub encoded: bool,
    /// Stored value the draft was seeded from.
    #[serde(default)]
    pub original: String,
}

impl DraftValue {
    /// The string to store for this value.
    #[must_use]
    pub fn stored(&self) -> String {
        match self.magnitude {
            Some(magnitude) if self.encoded => {
                let unchanged = value::decode_trailing(&self.original)
                    .is_some_and(|(text, m)| text == self.text.trim() && m == magnitude);
                if unchanged {
                    self.original.clone()
                } else {
                    value::encode(&self.text, magnitude)
                }
            }
            _ => self.text.clone(),
        }
    }
}

/// In-progress edit of a single row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditDraft {
    pub description: String,
    pub questions: String,
    pub personal_pain: PainSet,
    pub corporate_pain: PainSet,
    pub values: Vec<DraftValue>,
}

impl EditDraft {
    /// Seed a draft from the current row.
    ///
    /// Pain tokens that do not normalize are logged here, since saving the
    /// draft will drop them from storage.
    #[must_use]
    pub fn from_row(row: &Row, sticky: &StickyNames) -> Self {
        let context = format!("{}/{}", row.section, row.characteristic);
        let pinned = is_sticky(row, sticky);
        let values = row
            .values
            .iter()
            .map(|pv| {
                let trailing = value::decode_trailing(&pv.value);
                match (pinned, trailing) {
                    (true, Some((text, magnitude))) => DraftValue {
                        plan: pv.plan.clone(),
                        text,
                        magnitude: Some(magnitude),
                        encoded: true,
                        original: pv.value.clone(),
                    },
                    (true, None) => DraftValue {
                        plan: pv.plan.clone(),
                        text: pv.value.clone(),
                        magnitude: Some(DEFAULT_EDIT_MAGNITUDE),
                        encoded: false,
                        original: pv.value.clone(),
                    },
                    (false, _) => DraftValue {
                        plan: pv.plan.clone(),
                        text: pv.value.clone(),
                        magnitude: None,
                        encoded: false,
                        original: pv.value.clone(),
                    },
                }
            })
            .collect();

        Self {
            description: row.description.clone(),
            questions: row.questions.clone(),
            personal_pain: pain::to_set_warning(&row.personal_pain, &context),
            corporate_pain: pain::to_set_warning(&row.corporate_pain, &context),
            values,
        }
    }

    #[must_use]
    pub fn value_for(&self, plan: &str) -> Option<&DraftValue> {
        self.values.iter().find(|v| v.plan == plan)
    }

    /// Replace the text of a plan's value. Returns `false` for unknown plans.
    pub fn set_text(&mut self, plan: &str, text: impl Into<String>) -> bool {
        match self.values.iter_mut().find(|v| v.plan == plan) {
            Some(slot) => {
                slot.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Replace the magnitude of a plan's encoded value. Returns `false` for
    /// unknown plans and for values that carry no magnitude.
    pub fn set_magnitude(&mut self, plan: &str, magnitude: u32) -> bool {
        match self.values.iter_mut().find(|v| v.plan == plan) {
            Some(slot) if slot.magnitude.is_some() => {
                slot.magnitude = Some(magnitude);
                slot.encoded = true;
                true
            }
            _ => false,
        }
    }
}

/// Compute the writes needed to turn `row` into `draft`.
///
/// Requests are emitted in a fixed order (description, questions, personal
/// pains, corporate pains, then one per plan in `plans` order). Plans absent
/// from the draft are left untouched.
#[must_use]
pub fn diff_edit(row: &Row, draft: &EditDraft, plans: &[String]) -> Vec<UpdateRequest> {
    let mut updates = Vec::new();

    if draft.description != row.description {
        updates.push(UpdateRequest::for_row(
            row,
            FieldType::Description,
            draft.description.clone(),
        ));
    }
    if draft.questions != row.questions {
        updates.push(UpdateRequest::for_row(
            row,
            FieldType::Questions,
            draft.questions.clone(),
        ));
    }

    let personal = pain::to_display_string(draft.personal_pain);
    if personal != pain::canonicalize(&row.personal_pain) {
        updates.push(UpdateRequest::for_row(row, FieldType::PersonalPain, personal));
    }
    let corporate = pain::to_display_string(draft.corporate_pain);
    if corporate != pain::canonicalize(&row.corporate_pain) {
        updates.push(UpdateRequest::for_row(
            row,
            FieldType::CorporatePain,
            corporate,
        ));
    }

    for plan in plans {
        let Some(draft_value) = draft.value_for(plan) else {
            continue;
        };
        let stored = draft_value.stored();
        if stored != row.value_for(plan) {
            updates.push(UpdateRequest::for_plan(row, plan, stored));
        }
    }

    updates
}

/// Result of one update call within an edit.
#[derive(Debug)]
pub struct UpdateResult<E> {
    pub request: UpdateRequest,
    pub result: Result<(), E>,
}

/// Per-request results of saving an edit. Edits are not atomic: some writes
/// may land while others fail.
#[derive(Debug)]
pub struct EditOutcome<E> {
    pub results: Vec<UpdateResult<E>>,
}

impl<E> Default for EditOutcome<E> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

impl<E> EditOutcome<E> {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn applied(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_ok()).count()
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&UpdateResult<E>> {
        self.results.iter().filter(|r| r.result.is_err()).collect()
    }

    /// Every request succeeded (vacuously true for a no-op edit).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(|r| r.result.is_ok())
    }

    /// Some requests succeeded and some failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.applied() > 0 && !self.is_complete()
    }
}
