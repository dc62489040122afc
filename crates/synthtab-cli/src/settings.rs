use std::path::Path;

use serde::{Deserialize, Serialize};
use synthtab_generate::LocaleKey;

use crate::CliError;

/// Default settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "synthtab.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    /// Sample count for columns that do not set their own.
    pub default_samples: usize,
    pub locale: LocaleKey,
    pub seed: Option<u64>,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            default_samples: 100,
            locale: LocaleKey::EnUs,
            seed: None,
        }
    }
}

/// Read settings from `path`, falling back to defaults when it does not exist.
pub fn load_settings(path: &Path) -> Result<CliSettings, CliError> {
    if !path.exists() {
        return Ok(CliSettings::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
