use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use synthtab_core::{ColumnType, ColumnValue, GeneratedColumn};

use crate::faker_rs::LocaleKey;

/// Options for the generation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Seed for reproducible draws; OS entropy when absent.
    pub seed: Option<u64>,
    /// Locale for names, emails and addresses.
    pub locale: LocaleKey,
    /// Reference date for age arithmetic; the local date when absent.
    pub today: Option<NaiveDate>,
}

/// Values produced by one successful generate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub values: Vec<ColumnValue>,
}

impl GenerationOutput {
    pub fn into_column(self, name: impl Into<String>) -> GeneratedColumn {
        GeneratedColumn {
            name: name.into(),
            column_type: self.column_type,
            values: self.values,
        }
    }
}
