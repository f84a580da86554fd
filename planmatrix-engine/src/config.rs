//! Matrix configuration: reserved sticky names and per-row progress direction.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{MIN_BAR_WIDTH, SECTION_ORDER_KEY, STICKY_PRIMARY, STICKY_SECONDARY};
use crate::progress::ProgressDirection;

/// Errors raised when matrix configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sticky name {field} must not be blank")]
    BlankStickyName { field: &'static str },
    #[error("sticky names must differ (both are {name:?})")]
    DuplicateStickyName { name: String },
    #[error("min bar width must be between 0 and 100 (got {value:.2})")]
    BarWidthRange { value: f64 },
    #[error("section order key must not be blank")]
    BlankPreferenceKey,
}

/// Names of the two header rows pinned above the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickyNames {
    /// Always rendered first.
    #[serde(default = "StickyNames::default_primary")]
    pub primary: String,
    #[serde(default = "StickyNames::default_secondary")]
    pub secondary: String,
}

impl StickyNames {
    fn default_primary() -> String {
        STICKY_PRIMARY.to_string()
    }

    fn default_secondary() -> String {
        STICKY_SECONDARY.to_string()
    }

    #[must_use]
    pub fn contains(&self, characteristic: &str) -> bool {
        self.primary == characteristic || self.secondary == characteristic
    }

    /// Sort rank of a sticky name: primary before secondary.
    #[must_use]
    pub fn rank(&self, characteristic: &str) -> Option<u8> {
        if self.primary == characteristic {
            Some(0)
        } else if self.secondary == characteristic {
            Some(1)
        } else {
            None
        }
    }
}

impl Default for StickyNames {
    fn default() -> Self {
        Self {
            primary: Self::default_primary(),
            secondary: Self::default_secondary(),
        }
    }
}

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixConfig {
    #[serde(default)]
    pub sticky: StickyNames,
    /// Progress direction overrides keyed by characteristic name.
    #[serde(default)]
    pub progress_direction: BTreeMap<String, ProgressDirection>,
    #[serde(default = "MatrixConfig::default_min_bar_width")]
    pub min_bar_width: f64,
    #[serde(default = "MatrixConfig::default_section_order_key")]
    pub section_order_key: String,
}

impl MatrixConfig {
    const fn default_min_bar_width() -> f64 {
        MIN_BAR_WIDTH
    }

    fn default_section_order_key() -> String {
        SECTION_ORDER_KEY.to_string()
    }

    /// Load configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the configuration is invalid.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sticky.primary.trim().is_empty() {
            return Err(ConfigError::BlankStickyName { field: "primary" });
        }
        if self.sticky.secondary.trim().is_empty() {
            return Err(ConfigError::BlankStickyName { field: "secondary" });
        }
        if self.sticky.primary == self.sticky.secondary {
            return Err(ConfigError::DuplicateStickyName {
                name: self.sticky.primary.clone(),
            });
        }
        if !(0.0..=100.0).contains(&self.min_bar_width) {
            return Err(ConfigError::BarWidthRange {
                value: self.min_bar_width,
            });
        }
        if self.section_order_key.trim().is_empty() {
            return Err(ConfigError::BlankPreferenceKey);
        }
        Ok(())
    }

    /// Progress direction for a characteristic, defaulting to higher-is-fuller.
    #[must_use]
    pub fn direction_for(&self, characteristic: &str) -> ProgressDirection {
        self.progress_direction
            .get(characteristic)
            .copied()
            .unwrap_or_default()
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            sticky: StickyNames::default(),
            progress_direction: BTreeMap::new(),
            min_bar_width: Self::default_min_bar_width(),
            section_order_key: Self::default_section_order_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MatrixConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sticky.primary, "Cost");
        assert_eq!(config.sticky.secondary, "Timeline");
        assert_eq!(config.section_order_key, "sectionOrder");
        assert_eq!(
            config.direction_for("Cost"),
            ProgressDirection::HigherIsFuller
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = MatrixConfig::from_json(
            r#"{ "progress_direction": { "Cost": "lower_is_fuller" } }"#,
        )
        .unwrap();
        assert_eq!(config.sticky, StickyNames::default());
        assert_eq!(config.direction_for("Cost"), ProgressDirection::LowerIsFuller);
        assert_eq!(
            config.direction_for("Timeline"),
            ProgressDirection::HigherIsFuller
        );
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = MatrixConfig::default();
        config.sticky.secondary = "Cost".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateStickyName {
                name: "Cost".to_string()
            })
        );

        let mut config = MatrixConfig::default();
        config.sticky.primary = "  ".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::BlankStickyName { field: "primary" })
        );

        let mut config = MatrixConfig::default();
        config.min_bar_width = 120.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BarWidthRange { .. })
        ));

        assert!(MatrixConfig::from_json(r#"{ "section_order_key": "" }"#).is_err());
    }

    #[test]
    fn sticky_rank_orders_primary_first() {
        let names = StickyNames::default();
        assert_eq!(names.rank("Cost"), Some(0));
        assert_eq!(names.rank("Timeline"), Some(1));
        assert_eq!(names.rank("Support"), None);
        assert!(names.contains("Timeline"));
    }
}
