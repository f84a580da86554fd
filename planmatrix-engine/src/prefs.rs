//! Client-local preferences: the section order hint.
//!
//! The saved order is a hint only. It is never validated on save; stale or
//! unknown names are tolerated and resolved away when the order is applied.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

use crate::constants::SECTION_ORDER_KEY;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to read preferences: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write preferences: {0}")]
    Write(#[source] std::io::Error),
    #[error("malformed preference value for {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("preferences unavailable: {0}")]
    Unavailable(String),
}

/// Trait for abstracting the local key-value preference storage.
pub trait PreferenceStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the saved section order, `None` if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be read.
    fn load_section_order(&self) -> Result<Option<Vec<String>>, Self::Error>;

    /// Save the section order.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be written.
    fn save_section_order(&self, order: &[String]) -> Result<(), Self::Error>;
}

/// Preferences kept in memory as JSON strings under their keys.
#[derive(Debug, Clone)]
pub struct MemoryPreferences {
    key: String,
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    fail_writes: Rc<RefCell<bool>>,
}

impl Default for MemoryPreferences {
    fn default() -> Self {
        Self::with_key(SECTION_ORDER_KEY)
    }
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the section order under a custom key.
    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Rc::default(),
            fail_writes: Rc::default(),
        }
    }

    /// Seed a raw value, as if written by an earlier session.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Make every following write fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }
}

impl PreferenceStore for MemoryPreferences {
    type Error = PreferenceError;

    fn load_section_order(&self) -> Result<Option<Vec<String>>, Self::Error> {
        let Some(raw) = self.raw(&self.key) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| PreferenceError::Malformed {
                key: self.key.clone(),
                source,
            })
    }

    fn save_section_order(&self, order: &[String]) -> Result<(), Self::Error> {
        if *self.fail_writes.borrow() {
            return Err(PreferenceError::Unavailable("writes disabled".to_string()));
        }
        let raw = serde_json::to_string(order).map_err(|source| PreferenceError::Malformed {
            key: self.key.clone(),
            source,
        })?;
        self.insert_raw(self.key.clone(), raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_round_trips_under_fixed_key() {
        let prefs = MemoryPreferences::new();
        assert!(prefs.load_section_order().unwrap().is_none());
        let order = vec!["Pricing".to_string(), "Support".to_string()];
        prefs.save_section_order(&order).unwrap();
        assert_eq!(
            prefs.raw("sectionOrder").as_deref(),
            Some(r#"["Pricing","Support"]"#)
        );
        assert_eq!(prefs.load_section_order().unwrap(), Some(order));
    }

    #[test]
    fn custom_key_is_honored() {
        let prefs = MemoryPreferences::with_key("matrix.sections");
        prefs.save_section_order(&["A".to_string()]).unwrap();
        assert!(prefs.raw(SECTION_ORDER_KEY).is_none());
        assert_eq!(prefs.raw("matrix.sections").as_deref(), Some(r#"["A"]"#));
    }

    #[test]
    fn malformed_values_are_reported() {
        let prefs = MemoryPreferences::new();
        prefs.insert_raw(SECTION_ORDER_KEY, "{not json");
        assert!(matches!(
            prefs.load_section_order(),
            Err(PreferenceError::Malformed { .. })
        ));
    }

    #[test]
    fn failing_writes_leave_previous_value() {
        let prefs = MemoryPreferences::new();
        prefs.save_section_order(&["A".to_string()]).unwrap();
        prefs.set_fail_writes(true);
        assert!(prefs.save_section_order(&["B".to_string()]).is_err());
        assert_eq!(
            prefs.load_section_order().unwrap(),
            Some(vec!["A".to_string()])
        );
    }
}
