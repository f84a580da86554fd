//! Preferences persisted to a JSON file between runs.

use chrono::Utc;
use planmatrix_engine::{PreferenceError, PreferenceStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreferenceFile {
    #[serde(default)]
    entries: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

/// Key-value preferences stored in a JSON file.
///
/// Without a path nothing is loaded and saving fails, so a reorder without
/// `--prefs` is reported as not persisted.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: Option<PathBuf>,
    key: String,
}

impl FilePreferences {
    pub fn new(path: Option<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path,
            key: key.into(),
        }
    }

    fn read(&self) -> Result<PreferenceFile, PreferenceError> {
        let Some(path) = &self.path else {
            return Ok(PreferenceFile::default());
        };
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PreferenceFile::default());
            }
            Err(err) => return Err(PreferenceError::Read(err)),
        };
        serde_json::from_str(&raw).map_err(|source| PreferenceError::Malformed {
            key: path.display().to_string(),
            source,
        })
    }
}

impl PreferenceStore for FilePreferences {
    type Error = PreferenceError;

    fn load_section_order(&self) -> Result<Option<Vec<String>>, Self::Error> {
        let file = self.read()?;
        let Some(value) = file.entries.get(&self.key) else {
            return Ok(None);
        };
        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|source| PreferenceError::Malformed {
                key: self.key.clone(),
                source,
            })
    }

    fn save_section_order(&self, order: &[String]) -> Result<(), Self::Error> {
        let Some(path) = &self.path else {
            return Err(PreferenceError::Unavailable(
                "no preference file given".to_string(),
            ));
        };
        let mut file = self.read()?;
        let value = serde_json::to_value(order).map_err(|source| PreferenceError::Malformed {
            key: self.key.clone(),
            source,
        })?;
        file.entries.insert(self.key.clone(), value);
        file.updated_at = Some(Utc::now().to_rfc3339());
        let json = serde_json::to_string_pretty(&file).map_err(|source| {
            PreferenceError::Malformed {
                key: self.key.clone(),
                source,
            }
        })?;
        std::fs::write(path, json).map_err(PreferenceError::Write)
    }
}
