use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Semantic category of a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Name,
    Age,
    Dob,
    Email,
    Address,
    Correlated,
    Gamma,
    Uniform,
    Normal,
    Categorical,
}

impl ColumnType {
    /// Every column type, in display order.
    pub const ALL: [ColumnType; 10] = [
        ColumnType::Name,
        ColumnType::Age,
        ColumnType::Dob,
        ColumnType::Email,
        ColumnType::Address,
        ColumnType::Correlated,
        ColumnType::Gamma,
        ColumnType::Uniform,
        ColumnType::Normal,
        ColumnType::Categorical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Name => "name",
            ColumnType::Age => "age",
            ColumnType::Dob => "dob",
            ColumnType::Email => "email",
            ColumnType::Address => "address",
            ColumnType::Correlated => "correlated",
            ColumnType::Gamma => "gamma",
            ColumnType::Uniform => "uniform",
            ColumnType::Normal => "normal",
            ColumnType::Categorical => "categorical",
        }
    }

    /// The column type whose values this type can be derived from, if any.
    ///
    /// `Correlated` derives from any numeric column, see [`ColumnType::is_numeric`].
    pub fn correlation_source(self) -> Option<ColumnType> {
        match self {
            ColumnType::Age => Some(ColumnType::Dob),
            ColumnType::Dob => Some(ColumnType::Age),
            ColumnType::Name => Some(ColumnType::Email),
            ColumnType::Email => Some(ColumnType::Name),
            _ => None,
        }
    }

    pub fn supports_correlation(self) -> bool {
        self == ColumnType::Correlated || self.correlation_source().is_some()
    }

    /// Column types holding numeric values before rounding.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnType::Age
                | ColumnType::Correlated
                | ColumnType::Gamma
                | ColumnType::Uniform
                | ColumnType::Normal
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ColumnType::ALL
            .into_iter()
            .find(|column_type| column_type.as_str() == value)
            .ok_or_else(|| Error::UnknownColumnType(value.to_string()))
    }
}

/// A single cell of a generated column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ColumnValue {
    Number(f64),
    Text(String),
}

impl ColumnValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Number(value) => Some(*value),
            ColumnValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(value) => Some(value.as_str()),
            ColumnValue::Number(_) => None,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Number(value) => write!(f, "{value}"),
            ColumnValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        ColumnValue::Number(value)
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

/// A column whose values were produced by the generation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedColumn {
    pub name: String,
    #[serde(rename = "columnType")]
    pub column_type: ColumnType,
    pub values: Vec<ColumnValue>,
}

/// A column parsed from an uploaded table whose type is not known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UnknownColumn {
    pub name: String,
    pub values: Vec<String>,
}

/// Entry of a session's column list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Column {
    /// Placeholder column that has not been generated yet.
    Empty { name: String },
    Generated(GeneratedColumn),
    Unknown(UnknownColumn),
}

impl Column {
    pub fn empty(name: impl Into<String>) -> Self {
        Column::Empty { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Column::Empty { name } => name,
            Column::Generated(column) => &column.name,
            Column::Unknown(column) => &column.name,
        }
    }

    /// Rename the column without touching its values.
    pub fn set_name(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self {
            Column::Empty { name } => *name = value,
            Column::Generated(column) => column.name = value,
            Column::Unknown(column) => column.name = value,
        }
    }

    /// Number of values, or `None` for columns without values.
    pub fn len(&self) -> Option<usize> {
        match self {
            Column::Empty { .. } => None,
            Column::Generated(column) => Some(column.values.len()),
            Column::Unknown(column) => Some(column.values.len()),
        }
    }

    pub fn has_values(&self) -> bool {
        self.len().is_some()
    }

    pub fn cell(&self, index: usize) -> Option<ColumnValue> {
        match self {
            Column::Empty { .. } => None,
            Column::Generated(column) => column.values.get(index).cloned(),
            Column::Unknown(column) => column
                .values
                .get(index)
                .map(|value| ColumnValue::Text(value.clone())),
        }
    }

    pub fn as_generated(&self) -> Option<&GeneratedColumn> {
        match self {
            Column::Generated(column) => Some(column),
            _ => None,
        }
    }

    pub fn header(&self) -> Header {
        match self {
            Column::Empty { name } => Header::Empty { name: name.clone() },
            Column::Generated(column) => Header::Generated {
                name: column.name.clone(),
                column_type: column.column_type,
            },
            Column::Unknown(column) => Header::Unknown {
                name: column.name.clone(),
            },
        }
    }
}

impl From<GeneratedColumn> for Column {
    fn from(column: GeneratedColumn) -> Self {
        Column::Generated(column)
    }
}

impl From<UnknownColumn> for Column {
    fn from(column: UnknownColumn) -> Self {
        Column::Unknown(column)
    }
}

/// Header cell for a column list, carrying the column type when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Header {
    Empty {
        name: String,
    },
    Generated {
        name: String,
        #[serde(rename = "columnType")]
        column_type: ColumnType,
    },
    Unknown {
        name: String,
    },
}

impl Header {
    pub fn name(&self) -> &str {
        match self {
            Header::Empty { name } | Header::Generated { name, .. } | Header::Unknown { name } => {
                name
            }
        }
    }
}
