use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProjectResult;

/// Metadata written into the info dictionary of new projects.
///
/// Every key is optional in TOML; missing keys keep their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
    pub os_version: String,
    pub platform: String,
    pub language: String,
    pub comment: String,
    pub author: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            os_version: "NT".into(),
            platform: "Win32".into(),
            language: "en".into(),
            comment: String::new(),
            author: String::new(),
        }
    }
}

impl ProjectConfig {
    pub fn from_toml_str(s: &str) -> ProjectResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ProjectResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
