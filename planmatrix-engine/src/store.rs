//! Storage collaborator contract and an in-memory reference implementation.
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

use crate::constants::EMPTY_VALUE;
use crate::data::{CharacteristicRecord, Plan};
use crate::edit::{FieldType, UpdateRequest};
use crate::ordering::{known_sections, reorder_section_records};
use crate::pain;

/// Errors raised by [`MemoryStore`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("section {section:?} not found")]
    SectionNotFound { section: String },
    #[error("section {section:?} already exists")]
    SectionExists { section: String },
    #[error("characteristic {characteristic:?} not found in section {section:?}")]
    CharacteristicNotFound {
        section: String,
        characteristic: String,
    },
    #[error("characteristic {characteristic:?} already exists in section {section:?}")]
    CharacteristicExists {
        section: String,
        characteristic: String,
    },
    #[error("plan {plan:?} not found")]
    PlanNotFound { plan: String },
    #[error("value updates require a plan name")]
    MissingPlanName,
    #[error("{what} must not be blank")]
    BlankName { what: &'static str },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Section entry as listed by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub name: String,
    pub characteristics_count: usize,
}

/// Payload for adding a characteristic to a section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewCharacteristic {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: String,
    #[serde(default)]
    pub personal_pain: String,
    #[serde(default)]
    pub corporate_pain: String,
    /// Initial value per plan name; plans not listed start at `-`.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl NewCharacteristic {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Trait for abstracting the authoritative plan storage.
/// Mutations are independent calls; nothing is transactional across them.
pub trait PlanStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch every plan with its ordered characteristics.
    ///
    /// # Errors
    ///
    /// Returns an error if the plans cannot be loaded.
    fn list_plans(&self) -> Result<Vec<Plan>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the sections cannot be listed.
    fn list_sections(&self) -> Result<Vec<SectionSummary>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the section exists or cannot be created.
    fn create_section(&self, name: &str) -> Result<(), Self::Error>;

    /// Remove a section and every characteristic in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the section does not exist.
    fn delete_section(&self, name: &str) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the section is missing or the new name is taken.
    fn rename_section(&self, name: &str, new_name: &str) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the section is missing or the name is taken.
    fn add_characteristic(
        &self,
        section: &str,
        characteristic: &NewCharacteristic,
    ) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the characteristic does not exist.
    fn delete_characteristic(&self, section: &str, characteristic: &str)
    -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the characteristic is missing or the new name is taken.
    fn rename_characteristic(
        &self,
        section: &str,
        characteristic: &str,
        new_name: &str,
    ) -> Result<(), Self::Error>;

    /// Persist the characteristic order of a section. Listed names come
    /// first; unlisted characteristics keep their relative order after them.
    ///
    /// # Errors
    ///
    /// Returns an error if the section does not exist.
    fn reorder_characteristics(&self, section: &str, names: &[String])
    -> Result<(), Self::Error>;

    /// Write a single field.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be found or written.
    fn update_value(&self, request: &UpdateRequest) -> Result<(), Self::Error>;
}

#[derive(Debug, Default)]
struct MemoryState {
    plans: Vec<Plan>,
    sections: Vec<String>,
    skip_before_failure: usize,
    pending_failures: usize,
}

impl MemoryState {
    fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s == name)
    }

    fn require_section(&self, name: &str) -> Result<(), StoreError> {
        if self.has_section(name) {
            Ok(())
        } else {
            Err(StoreError::SectionNotFound {
                section: name.to_string(),
            })
        }
    }

    fn has_characteristic(&self, section: &str, characteristic: &str) -> bool {
        self.plans
            .iter()
            .any(|plan| plan.find(section, characteristic).is_some())
    }

    fn require_characteristic(&self, section: &str, characteristic: &str) -> Result<(), StoreError> {
        if self.has_characteristic(section, characteristic) {
            Ok(())
        } else {
            Err(StoreError::CharacteristicNotFound {
                section: section.to_string(),
                characteristic: characteristic.to_string(),
            })
        }
    }

    fn records_mut(&mut self) -> impl Iterator<Item = &mut CharacteristicRecord> {
        self.plans
            .iter_mut()
            .flat_map(|plan| plan.characteristics.iter_mut())
    }

    /// Consume one scheduled failure, if any is due.
    fn take_failure(&mut self) -> Result<(), StoreError> {
        if self.pending_failures == 0 {
            return Ok(());
        }
        if self.skip_before_failure > 0 {
            self.skip_before_failure -= 1;
            return Ok(());
        }
        self.pending_failures -= 1;
        Err(StoreError::Unavailable("injected failure".to_string()))
    }
}

/// In-memory [`PlanStore`] over a list of plans.
///
/// Clones share state, so a test can keep a handle after handing the store
/// to a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(plans: Vec<Plan>) -> Self {
        let sections = known_sections(&plans);
        Self {
            state: Rc::new(RefCell::new(MemoryState {
                plans,
                sections,
                ..MemoryState::default()
            })),
        }
    }

    /// Make the next `count` mutating calls fail.
    pub fn fail_next(&self, count: usize) {
        self.fail_after(0, count);
    }

    /// Let `successes` mutating calls through, then fail the next `count`.
    pub fn fail_after(&self, successes: usize, count: usize) {
        let mut state = self.state.borrow_mut();
        state.skip_before_failure = successes;
        state.pending_failures = count;
    }

    /// Current plans, for inspection.
    #[must_use]
    pub fn plans(&self) -> Vec<Plan> {
        self.state.borrow().plans.clone()
    }

    fn mutate<F>(&self, op: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut MemoryState) -> Result<(), StoreError>,
    {
        let mut state = self.state.borrow_mut();
        state.take_failure()?;
        op(&mut *state)
    }
}

fn require_name<'a>(name: &'a str, what: &'static str) -> Result<&'a str, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(StoreError::BlankName { what })
    } else {
        Ok(trimmed)
    }
}

impl PlanStore for MemoryStore {
    type Error = StoreError;

    fn list_plans(&self) -> Result<Vec<Plan>, Self::Error> {
        Ok(self.plans())
    }

    fn list_sections(&self) -> Result<Vec<SectionSummary>, Self::Error> {
        let state = self.state.borrow();
        Ok(state
            .sections
            .iter()
            .map(|section| {
                let mut names: Vec<&str> = state
                    .plans
                    .iter()
                    .flat_map(|plan| &plan.characteristics)
                    .filter(|r| r.section == *section && !r.is_section_header)
                    .map(|r| r.characteristic.as_str())
                    .collect();
                names.sort_unstable();
                names.dedup();
                SectionSummary {
                    name: section.clone(),
                    characteristics_count: names.len(),
                }
            })
            .collect())
    }

    fn create_section(&self, name: &str) -> Result<(), Self::Error> {
        self.mutate(|state| {
            let name = require_name(name, "section name")?;
            if state.has_section(name) {
                return Err(StoreError::SectionExists {
                    section: name.to_string(),
                });
            }
            state.sections.push(name.to_string());
            Ok(())
        })
    }

    fn delete_section(&self, name: &str) -> Result<(), Self::Error> {
        self.mutate(|state| {
            state.require_section(name)?;
            state.sections.retain(|s| s != name);
            for plan in &mut state.plans {
                plan.characteristics.retain(|r| r.section != name);
            }
            Ok(())
        })
    }

    fn rename_section(&self, name: &str, new_name: &str) -> Result<(), Self::Error> {
        self.mutate(|state| {
            state.require_section(name)?;
            let new_name = require_name(new_name, "section name")?;
            if new_name == name {
                return Ok(());
            }
            if state.has_section(new_name) {
                return Err(StoreError::SectionExists {
                    section: new_name.to_string(),
                });
            }
            for section in &mut state.sections {
                if section == name {
                    *section = new_name.to_string();
                }
            }
            for record in state.records_mut().filter(|r| r.section == name) {
                record.section = new_name.to_string();
            }
            Ok(())
        })
    }

    fn add_characteristic(
        &self,
        section: &str,
        characteristic: &NewCharacteristic,
    ) -> Result<(), Self::Error> {
        self.mutate(|state| {
            state.require_section(section)?;
            let name = require_name(&characteristic.name, "characteristic name")?;
            if state.has_characteristic(section, name) {
                return Err(StoreError::CharacteristicExists {
                    section: section.to_string(),
                    characteristic: name.to_string(),
                });
            }
            let personal = pain::canonicalize(&characteristic.personal_pain);
            let corporate = pain::canonicalize(&characteristic.corporate_pain);
            for plan in &mut state.plans {
                let value = characteristic
                    .values
                    .get(&plan.name)
                    .cloned()
                    .unwrap_or_else(|| EMPTY_VALUE.to_string());
                let record = CharacteristicRecord {
                    description: characteristic.description.clone(),
                    questions: characteristic.questions.clone(),
                    ..CharacteristicRecord::new(section, name)
                }
                .with_pains(personal.clone(), corporate.clone())
                .with_value(value);
                plan.characteristics.push(record);
            }
            Ok(())
        })
    }

    fn delete_characteristic(
        &self,
        section: &str,
        characteristic: &str,
    ) -> Result<(), Self::Error> {
        self.mutate(|state| {
            state.require_characteristic(section, characteristic)?;
            for plan in &mut state.plans {
                plan.characteristics
                    .retain(|r| !r.is(section, characteristic));
            }
            Ok(())
        })
    }

    fn rename_characteristic(
        &self,
        section: &str,
        characteristic: &str,
        new_name: &str,
    ) -> Result<(), Self::Error> {
        self.mutate(|state| {
            state.require_characteristic(section, characteristic)?;
            let new_name = require_name(new_name, "characteristic name")?;
            if new_name == characteristic {
                return Ok(());
            }
            if state.has_characteristic(section, new_name) {
                return Err(StoreError::CharacteristicExists {
                    section: section.to_string(),
                    characteristic: new_name.to_string(),
                });
            }
            for record in state
                .records_mut()
                .filter(|r| r.is(section, characteristic))
            {
                record.characteristic = new_name.to_string();
            }
            Ok(())
        })
    }

    fn reorder_characteristics(
        &self,
        section: &str,
        names: &[String],
    ) -> Result<(), Self::Error> {
        self.mutate(|state| {
            state.require_section(section)?;
            for plan in &mut state.plans {
                reorder_section_records(plan, section, names);
            }
            Ok(())
        })
    }

    fn update_value(&self, request: &UpdateRequest) -> Result<(), Self::Error> {
        self.mutate(|state| {
            state.require_characteristic(&request.section, &request.characteristic)?;
            if request.field_type == FieldType::Value {
                let plan_name = request
                    .plan_name
                    .as_deref()
                    .ok_or(StoreError::MissingPlanName)?;
                let plan = state
                    .plans
                    .iter_mut()
                    .find(|plan| plan.name == plan_name)
                    .ok_or_else(|| StoreError::PlanNotFound {
                        plan: plan_name.to_string(),
                    })?;
                let record = plan
                    .find_mut(&request.section, &request.characteristic)
                    .ok_or_else(|| StoreError::CharacteristicNotFound {
                        section: request.section.clone(),
                        characteristic: request.characteristic.clone(),
                    })?;
                record.value = Some(request.new_value.clone());
                record.raw_value = None;
                return Ok(());
            }

            for record in state
                .records_mut()
                .filter(|r| r.is(&request.section, &request.characteristic))
            {
                match request.field_type {
                    FieldType::Description => record.description = request.new_value.clone(),
                    FieldType::Questions => record.questions = request.new_value.clone(),
                    FieldType::PersonalPain => {
                        record.personal_pain = pain::canonicalize(&request.new_value);
                    }
                    FieldType::CorporatePain => {
                        record.corporate_pain = pain::canonicalize(&request.new_value);
                    }
                    FieldType::Value => {}
                }
            }
            Ok(())
        })
    }
}
