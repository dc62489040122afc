//! Loosely typed generator configuration built up field by field.
//!
//! Every leaf is "present or absent" and untyped until validation: numbers
//! arrive as JSON values so a wrong type is reported by the validator rather
//! than rejected on input. Correlation targets reference existing generated
//! columns by name.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use synthtab_core::ColumnType;

use crate::rounding::RoundingKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfiguration {
    pub column_type: Option<ColumnType>,
    pub age_range: AgeRangeConfig,
    /// Email column a name column is derived from.
    pub name_correlates_to: Option<String>,
    /// Name column an email column is derived from.
    pub email_correlates_to: Option<String>,
    pub correlated: CorrelatedConfig,
    pub gamma: MeanDeviationConfig,
    pub uniform: RangeConfig,
    pub normal: MeanDeviationConfig,
    pub categorical: CategoricalConfig,
    pub rounding: RoundingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AgeRangeConfig {
    pub min: Option<Value>,
    pub max: Option<Value>,
    /// Date-of-birth column (for ages) or age column (for dates of birth).
    pub correlates_to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CorrelatedConfig {
    pub correlates_to: Option<String>,
    pub gradient: Option<Value>,
    /// Intercept.
    pub c: Option<Value>,
    /// Mean of the noise term.
    pub loc: Option<Value>,
    pub standard_deviation: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MeanDeviationConfig {
    pub mean: Option<Value>,
    pub standard_deviation: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RangeConfig {
    pub min: Option<Value>,
    pub max: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CategoricalConfig {
    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CategoryConfig {
    pub id: Option<String>,
    pub name: Option<Value>,
    pub probability: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RoundingConfig {
    /// `significant` or `decimal`.
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    /// Digit or decimal-place count; required whenever `type` is set.
    pub value: Option<Value>,
}

impl GeneratorConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_type(column_type: ColumnType) -> Self {
        Self {
            column_type: Some(column_type),
            ..Self::default()
        }
    }

    pub fn set_column_type(&mut self, column_type: ColumnType) -> &mut Self {
        self.column_type = Some(column_type);
        self
    }

    pub fn set_age_range_min(&mut self, value: f64) -> &mut Self {
        self.age_range.min = Some(Value::from(value));
        self
    }

    pub fn set_age_range_max(&mut self, value: f64) -> &mut Self {
        self.age_range.max = Some(Value::from(value));
        self
    }

    pub fn set_age_correlates_to(&mut self, column: Option<String>) -> &mut Self {
        self.age_range.correlates_to = column;
        self
    }

    pub fn set_name_correlates_to(&mut self, column: Option<String>) -> &mut Self {
        self.name_correlates_to = column;
        self
    }

    pub fn set_email_correlates_to(&mut self, column: Option<String>) -> &mut Self {
        self.email_correlates_to = column;
        self
    }

    pub fn set_correlated_correlates_to(&mut self, column: impl Into<String>) -> &mut Self {
        self.correlated.correlates_to = Some(column.into());
        self
    }

    pub fn set_correlated_gradient(&mut self, value: f64) -> &mut Self {
        self.correlated.gradient = Some(Value::from(value));
        self
    }

    pub fn set_correlated_c(&mut self, value: f64) -> &mut Self {
        self.correlated.c = Some(Value::from(value));
        self
    }

    pub fn set_correlated_loc(&mut self, value: f64) -> &mut Self {
        self.correlated.loc = Some(Value::from(value));
        self
    }

    pub fn set_correlated_standard_deviation(&mut self, value: f64) -> &mut Self {
        self.correlated.standard_deviation = Some(Value::from(value));
        self
    }

    pub fn set_gamma_mean(&mut self, value: f64) -> &mut Self {
        self.gamma.mean = Some(Value::from(value));
        self
    }

    pub fn set_gamma_standard_deviation(&mut self, value: f64) -> &mut Self {
        self.gamma.standard_deviation = Some(Value::from(value));
        self
    }

    pub fn set_normal_mean(&mut self, value: f64) -> &mut Self {
        self.normal.mean = Some(Value::from(value));
        self
    }

    pub fn set_normal_standard_deviation(&mut self, value: f64) -> &mut Self {
        self.normal.standard_deviation = Some(Value::from(value));
        self
    }

    pub fn set_uniform_min(&mut self, value: f64) -> &mut Self {
        self.uniform.min = Some(Value::from(value));
        self
    }

    pub fn set_uniform_max(&mut self, value: f64) -> &mut Self {
        self.uniform.max = Some(Value::from(value));
        self
    }

    pub fn set_rounding_type(&mut self, kind: Option<RoundingKind>) -> &mut Self {
        self.rounding.kind = kind.map(|kind| Value::from(kind.as_str()));
        self
    }

    pub fn set_rounding_value(&mut self, value: u32) -> &mut Self {
        self.rounding.value = Some(Value::from(value));
        self
    }

    /// Probability left over by the categories so far, never below zero.
    pub fn remaining_probability(&self) -> f64 {
        let used: f64 = self
            .categorical
            .categories
            .iter()
            .filter_map(|category| category.probability.as_ref().and_then(Value::as_f64))
            .sum();
        (1.0 - used).max(0.0)
    }

    /// Append a category and return its id.
    ///
    /// Without an explicit probability the category takes the remaining
    /// probability of the set. Once the set already sums to one or more that
    /// remainder is zero, so the category is stored with probability 0 and
    /// validation rejects it until a probability is set.
    pub fn add_category(&mut self, name: impl Into<String>, probability: Option<f64>) -> String {
        let probability = probability.unwrap_or_else(|| self.remaining_probability());
        let id = uuid::Uuid::new_v4().to_string();
        self.categorical.categories.push(CategoryConfig {
            id: Some(id.clone()),
            name: Some(Value::from(name.into())),
            probability: Some(Value::from(probability)),
        });
        id
    }

    pub fn set_category_probability(&mut self, id: &str, probability: f64) -> bool {
        match self
            .categorical
            .categories
            .iter_mut()
            .find(|category| category.id.as_deref() == Some(id))
        {
            Some(category) => {
                category.probability = Some(Value::from(probability));
                true
            }
            None => false,
        }
    }

    pub fn remove_category(&mut self, id: &str) -> bool {
        let before = self.categorical.categories.len();
        self.categorical
            .categories
            .retain(|category| category.id.as_deref() != Some(id));
        self.categorical.categories.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::params::validate;

    fn probabilities(config: &GeneratorConfiguration) -> Vec<f64> {
        config
            .categorical
            .categories
            .iter()
            .map(|category| {
                category
                    .probability
                    .as_ref()
                    .and_then(Value::as_f64)
                    .expect("numeric probability")
            })
            .collect()
    }

    #[test]
    fn added_categories_split_the_remaining_probability() {
        let mut config = GeneratorConfiguration::for_type(ColumnType::Categorical);
        config.add_category("free", Some(0.25));
        assert_eq!(config.remaining_probability(), 0.75);
        config.add_category("paid", None);
        assert_eq!(probabilities(&config), vec![0.25, 0.75]);
        assert_eq!(config.remaining_probability(), 0.0);
    }

    #[test]
    fn remaining_probability_never_goes_negative() {
        let mut config = GeneratorConfiguration::for_type(ColumnType::Categorical);
        config.add_category("a", Some(0.8));
        config.add_category("b", Some(0.7));
        assert_eq!(config.remaining_probability(), 0.0);
    }

    #[test]
    fn category_added_to_a_full_set_is_rejected_until_weighted() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
        let mut config = GeneratorConfiguration::for_type(ColumnType::Categorical);
        config.add_category("a", Some(0.6));
        config.add_category("b", Some(0.6));
        let late = config.add_category("c", None);
        assert_eq!(probabilities(&config), vec![0.6, 0.6, 0.0]);

        let errors =
            validate(ColumnType::Categorical, &config, &[], today).expect_err("zero weight");
        assert_eq!(
            errors.messages(),
            vec!["categorical.categories[2].probability: must be non-zero".to_string()]
        );

        assert!(config.set_category_probability(&late, 0.2));
        assert!(validate(ColumnType::Categorical, &config, &[], today).is_ok());
    }

    #[test]
    fn category_updates_are_addressed_by_id() {
        let mut config = GeneratorConfiguration::for_type(ColumnType::Categorical);
        let first = config.add_category("a", Some(0.5));
        let second = config.add_category("b", None);

        assert!(config.set_category_probability(&first, 0.1));
        assert!(!config.set_category_probability("missing", 0.3));
        assert_eq!(probabilities(&config), vec![0.1, 0.5]);

        assert!(config.remove_category(&first));
        assert!(!config.remove_category(&first));
        assert_eq!(config.categorical.categories.len(), 1);
        assert_eq!(
            config.categorical.categories[0].id.as_deref(),
            Some(second.as_str())
        );
        assert_eq!(config.remaining_probability(), 0.5);
    }
}
