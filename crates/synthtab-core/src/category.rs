use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named outcome of a categorical column and its sampling weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    /// Unique identifier within a category set.
    pub id: String,
    pub name: String,
    /// Positive weight; sets are not required to sum to one.
    pub probability: f64,
}

impl Category {
    /// Create a category with a fresh random identifier.
    pub fn new(name: impl Into<String>, probability: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            probability,
        }
    }
}
