//! Validation of the loose configuration bag into strict generator parameters.
//!
//! Every field is checked and every problem recorded; nothing short-circuits,
//! so a rejected configuration lists all of its issues at once.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;
use synthtab_core::{Category, ColumnType, GeneratedColumn};
use tracing::warn;

use crate::config::{CategoricalConfig, GeneratorConfiguration, RoundingConfig};
use crate::correlate::{
    PersonName, coerce_ages, coerce_dates, coerce_emails, coerce_names, coerce_numbers,
};
use crate::errors::{GenerationErrors, GenerationIssue};
use crate::rounding::{MAX_ROUNDING_DIGITS, RoundingKind, RoundingParams};

/// Oldest age accepted for age ranges.
pub const MAX_AGE: u32 = 150;

const PROBABILITY_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Number,
    NonZero,
    Positive,
    NonNegative,
    Age,
}

/// Either explicit parameters or values derived from a source column.
#[derive(Debug, Clone, PartialEq)]
pub enum Derivation<P, S> {
    Independent(P),
    Correlated(Vec<S>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRangeParams {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatedParams {
    pub source: Vec<f64>,
    pub gradient: f64,
    pub intercept: f64,
    pub loc: f64,
    pub standard_deviation: f64,
    pub rounding: Option<RoundingParams>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaParams {
    pub mean: f64,
    pub standard_deviation: f64,
    pub rounding: Option<RoundingParams>,
}

impl GammaParams {
    pub fn shape(&self) -> f64 {
        (self.mean / self.standard_deviation).powi(2)
    }

    pub fn scale(&self) -> f64 {
        self.standard_deviation.powi(2) / self.mean
    }

    /// Shape and scale are both finite and strictly positive.
    pub fn is_representable(&self) -> bool {
        let (shape, scale) = (self.shape(), self.scale());
        shape.is_finite() && shape > 0.0 && scale.is_finite() && scale > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalParams {
    pub mean: f64,
    pub standard_deviation: f64,
    pub rounding: Option<RoundingParams>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformParams {
    pub min: f64,
    pub max: f64,
    pub rounding: Option<RoundingParams>,
}

/// Strict parameters for exactly one column type.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedParameters {
    /// Names drawn from the locale, or read back from an email column.
    Name(Derivation<(), PersonName>),
    /// Emails built from fresh names, or from a name column.
    Email(Derivation<(), PersonName>),
    /// Ages in a range, or computed from a date-of-birth column.
    Age(Derivation<AgeRangeParams, NaiveDate>),
    /// Dates of birth for an age range, or for each age of an age column.
    Dob(Derivation<AgeRangeParams, u32>),
    Address,
    Correlated(CorrelatedParams),
    Gamma(GammaParams),
    Uniform(UniformParams),
    Normal(NormalParams),
    Categorical(Vec<Category>),
}

impl ValidatedParameters {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ValidatedParameters::Name(_) => ColumnType::Name,
            ValidatedParameters::Email(_) => ColumnType::Email,
            ValidatedParameters::Age(_) => ColumnType::Age,
            ValidatedParameters::Dob(_) => ColumnType::Dob,
            ValidatedParameters::Address => ColumnType::Address,
            ValidatedParameters::Correlated(_) => ColumnType::Correlated,
            ValidatedParameters::Gamma(_) => ColumnType::Gamma,
            ValidatedParameters::Uniform(_) => ColumnType::Uniform,
            ValidatedParameters::Normal(_) => ColumnType::Normal,
            ValidatedParameters::Categorical(_) => ColumnType::Categorical,
        }
    }

    /// Whether values come from an existing column.
    pub fn is_correlated(&self) -> bool {
        match self {
            ValidatedParameters::Name(derivation) | ValidatedParameters::Email(derivation) => {
                matches!(derivation, Derivation::Correlated(_))
            }
            ValidatedParameters::Age(derivation) => matches!(derivation, Derivation::Correlated(_)),
            ValidatedParameters::Dob(derivation) => matches!(derivation, Derivation::Correlated(_)),
            ValidatedParameters::Correlated(_) => true,
            _ => false,
        }
    }
}

/// Validate `config` for `column_type` against the existing columns.
pub fn validate(
    column_type: ColumnType,
    config: &GeneratorConfiguration,
    columns: &[GeneratedColumn],
    today: NaiveDate,
) -> Result<ValidatedParameters, GenerationErrors> {
    let mut issues = GenerationErrors::new();
    let params = match column_type {
        ColumnType::Name => match selected(&config.name_correlates_to) {
            Some(source) => {
                let path = "nameCorrelatesTo";
                source_column(columns, source, path, |ty| ty == ColumnType::Email, &mut issues)
                    .and_then(|column| {
                        keep(coerce_emails(&values_path(path), &column.values), &mut issues)
                    })
                    .map(|names| ValidatedParameters::Name(Derivation::Correlated(names)))
            }
            None => Some(ValidatedParameters::Name(Derivation::Independent(()))),
        },
        ColumnType::Email => match selected(&config.email_correlates_to) {
            Some(source) => {
                let path = "emailCorrelatesTo";
                source_column(columns, source, path, |ty| ty == ColumnType::Name, &mut issues)
                    .and_then(|column| {
                        keep(coerce_names(&values_path(path), &column.values), &mut issues)
                    })
                    .map(|names| ValidatedParameters::Email(Derivation::Correlated(names)))
            }
            None => Some(ValidatedParameters::Email(Derivation::Independent(()))),
        },
        ColumnType::Age => match selected(&config.age_range.correlates_to) {
            Some(source) => {
                let path = "ageRange.correlatesTo";
                source_column(columns, source, path, |ty| ty == ColumnType::Dob, &mut issues)
                    .and_then(|column| {
                        keep(
                            coerce_dates(&values_path(path), &column.values, today),
                            &mut issues,
                        )
                    })
                    .map(|dates| ValidatedParameters::Age(Derivation::Correlated(dates)))
            }
            None => age_range(config, &mut issues)
                .map(|range| ValidatedParameters::Age(Derivation::Independent(range))),
        },
        ColumnType::Dob => match selected(&config.age_range.correlates_to) {
            Some(source) => {
                let path = "ageRange.correlatesTo";
                source_column(columns, source, path, |ty| ty == ColumnType::Age, &mut issues)
                    .and_then(|column| {
                        keep(coerce_ages(&values_path(path), &column.values), &mut issues)
                    })
                    .map(|ages| ValidatedParameters::Dob(Derivation::Correlated(ages)))
            }
            None => age_range(config, &mut issues)
                .map(|range| ValidatedParameters::Dob(Derivation::Independent(range))),
        },
        ColumnType::Address => Some(ValidatedParameters::Address),
        ColumnType::Correlated => correlated(config, columns, &mut issues),
        ColumnType::Gamma => {
            let mean = read_number(
                &mut issues,
                "gamma.mean",
                config.gamma.mean.as_ref(),
                ParamKind::Positive,
            );
            let standard_deviation = read_number(
                &mut issues,
                "gamma.standardDeviation",
                config.gamma.standard_deviation.as_ref(),
                ParamKind::Positive,
            );
            let rounding = read_rounding(&mut issues, &config.rounding);
            match (mean, standard_deviation) {
                (Some(mean), Some(standard_deviation)) => {
                    let params = GammaParams {
                        mean,
                        standard_deviation,
                        rounding,
                    };
                    if params.is_representable() {
                        Some(ValidatedParameters::Gamma(params))
                    } else {
                        issues.push(GenerationIssue::configuration(
                            "gamma",
                            format!(
                                "mean {mean} and standardDeviation {standard_deviation} give a \
                                 shape or scale outside the floating point range"
                            ),
                        ));
                        None
                    }
                }
                _ => None,
            }
        }
        ColumnType::Normal => {
            let mean = read_number(
                &mut issues,
                "normal.mean",
                config.normal.mean.as_ref(),
                ParamKind::NonZero,
            );
            let standard_deviation = read_number(
                &mut issues,
                "normal.standardDeviation",
                config.normal.standard_deviation.as_ref(),
                ParamKind::Positive,
            );
            let rounding = read_rounding(&mut issues, &config.rounding);
            match (mean, standard_deviation) {
                (Some(mean), Some(standard_deviation)) => {
                    Some(ValidatedParameters::Normal(NormalParams {
                        mean,
                        standard_deviation,
                        rounding,
                    }))
                }
                _ => None,
            }
        }
        ColumnType::Uniform => {
            let min = read_number(
                &mut issues,
                "uniform.min",
                config.uniform.min.as_ref(),
                ParamKind::Number,
            );
            let max = read_number(
                &mut issues,
                "uniform.max",
                config.uniform.max.as_ref(),
                ParamKind::Number,
            );
            let rounding = read_rounding(&mut issues, &config.rounding);
            match (min, max) {
                (Some(min), Some(max)) if min > max => {
                    issues.push(GenerationIssue::configuration(
                        "uniform.max",
                        format!("must be greater than or equal to min ({min})"),
                    ));
                    None
                }
                (Some(min), Some(max)) => Some(ValidatedParameters::Uniform(UniformParams {
                    min,
                    max,
                    rounding,
                })),
                _ => None,
            }
        }
        ColumnType::Categorical => {
            categories(&config.categorical, &mut issues).map(ValidatedParameters::Categorical)
        }
    };

    match params {
        Some(params) if issues.is_empty() => Ok(params),
        Some(_) => Err(issues),
        None if issues.is_empty() => Err(GenerationIssue::internal(format!(
            "{column_type} parameters rejected without a reason"
        ))
        .into()),
        None => Err(issues),
    }
}

/// Correlation target, with blank selections treated as "none".
fn selected(target: &Option<String>) -> Option<&str> {
    target
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

fn values_path(path: &str) -> String {
    format!("{path}.values")
}

fn keep<T>(result: Result<T, GenerationErrors>, issues: &mut GenerationErrors) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(errors) => {
            issues.merge(errors);
            None
        }
    }
}

/// Look up a correlation source by name among the generated columns.
///
/// A name that matches no column means the caller offered a column that does
/// not exist, which is a caller bug. A name shared by several columns is
/// rejected rather than resolved to whichever comes first.
fn source_column<'a>(
    columns: &'a [GeneratedColumn],
    name: &str,
    path: &str,
    accepts: impl Fn(ColumnType) -> bool,
    issues: &mut GenerationErrors,
) -> Option<&'a GeneratedColumn> {
    let mut matches = columns.iter().filter(|column| column.name == name);
    let Some(column) = matches.next() else {
        issues.push(GenerationIssue::internal(format!(
            "{path}: correlation source column '{name}' does not exist"
        )));
        return None;
    };
    let shared = matches.count();
    if shared > 0 {
        issues.push(GenerationIssue::configuration(
            path,
            format!(
                "column name '{name}' is shared by {} columns; rename them apart first",
                shared + 1
            ),
        ));
        return None;
    }
    if !accepts(column.column_type) {
        issues.push(GenerationIssue::configuration(
            path,
            format!(
                "column '{name}' is a {} column and cannot be correlated to",
                column.column_type
            ),
        ));
        return None;
    }
    Some(column)
}

fn age_range(
    config: &GeneratorConfiguration,
    issues: &mut GenerationErrors,
) -> Option<AgeRangeParams> {
    let min = read_number(
        issues,
        "ageRange.min",
        config.age_range.min.as_ref(),
        ParamKind::Age,
    );
    let max = read_number(
        issues,
        "ageRange.max",
        config.age_range.max.as_ref(),
        ParamKind::Age,
    );
    let (min, max) = (min? as u32, max? as u32);
    if min > max {
        issues.push(GenerationIssue::configuration(
            "ageRange.max",
            format!("must be greater than or equal to min ({min})"),
        ));
        return None;
    }
    Some(AgeRangeParams { min, max })
}

fn correlated(
    config: &GeneratorConfiguration,
    columns: &[GeneratedColumn],
    issues: &mut GenerationErrors,
) -> Option<ValidatedParameters> {
    let path = "correlated.correlatesTo";
    let source = match selected(&config.correlated.correlates_to) {
        Some(name) => source_column(columns, name, path, ColumnType::is_numeric, issues)
            .and_then(|column| keep(coerce_numbers(&values_path(path), &column.values), issues)),
        None => {
            issues.push(GenerationIssue::configuration(path, "is required"));
            None
        }
    };
    let gradient = read_number(
        issues,
        "correlated.gradient",
        config.correlated.gradient.as_ref(),
        ParamKind::Number,
    );
    let intercept = read_number(
        issues,
        "correlated.c",
        config.correlated.c.as_ref(),
        ParamKind::Number,
    );
    let loc = read_number(
        issues,
        "correlated.loc",
        config.correlated.loc.as_ref(),
        ParamKind::Number,
    );
    let standard_deviation = read_number(
        issues,
        "correlated.standardDeviation",
        config.correlated.standard_deviation.as_ref(),
        ParamKind::NonNegative,
    );
    let rounding = read_rounding(issues, &config.rounding);

    Some(ValidatedParameters::Correlated(CorrelatedParams {
        source: source?,
        gradient: gradient?,
        intercept: intercept?,
        loc: loc?,
        standard_deviation: standard_deviation?,
        rounding,
    }))
}

/// Rounding is optional; once a type is set the value becomes required.
fn read_rounding(issues: &mut GenerationErrors, config: &RoundingConfig) -> Option<RoundingParams> {
    let kind = match config.kind.as_ref()? {
        Value::String(kind) => match RoundingKind::parse(kind) {
            Some(kind) => Some(kind),
            None => {
                issues.push(GenerationIssue::configuration(
                    "rounding.type",
                    format!("expected 'significant' or 'decimal', got '{kind}'"),
                ));
                None
            }
        },
        other => {
            issues.push(GenerationIssue::configuration(
                "rounding.type",
                format!("expected a string, got {}", value_kind(other)),
            ));
            None
        }
    };

    let Some(value) = config.value.as_ref() else {
        issues.push(GenerationIssue::configuration(
            "rounding.value",
            "is required when rounding.type is set",
        ));
        return None;
    };
    let Some(digits) = value.as_f64() else {
        issues.push(GenerationIssue::configuration(
            "rounding.value",
            format!("expected a number, got {}", value_kind(value)),
        ));
        return None;
    };
    let kind = kind?;
    let min = kind.min_digits();
    if digits.fract() != 0.0 || digits < f64::from(min) || digits > f64::from(MAX_ROUNDING_DIGITS)
    {
        issues.push(GenerationIssue::configuration(
            "rounding.value",
            format!("must be a whole number between {min} and {MAX_ROUNDING_DIGITS}"),
        ));
        return None;
    }
    Some(RoundingParams {
        kind,
        digits: digits as u32,
    })
}

fn categories(config: &CategoricalConfig, issues: &mut GenerationErrors) -> Option<Vec<Category>> {
    if config.categories.is_empty() {
        issues.push(GenerationIssue::configuration(
            "categorical.categories",
            "at least one category is required",
        ));
        return None;
    }

    let before = issues.len();
    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(config.categories.len());
    for (index, category) in config.categories.iter().enumerate() {
        let path = format!("categorical.categories[{index}]");
        let name = match category.name.as_ref() {
            None => {
                issues.push(GenerationIssue::configuration(
                    format!("{path}.name"),
                    "is required",
                ));
                None
            }
            Some(Value::String(name)) if name.trim().is_empty() => {
                issues.push(GenerationIssue::configuration(
                    format!("{path}.name"),
                    "must not be empty",
                ));
                None
            }
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => {
                issues.push(GenerationIssue::configuration(
                    format!("{path}.name"),
                    format!("expected a string, got {}", value_kind(other)),
                ));
                None
            }
        };
        let probability = read_number(
            issues,
            &format!("{path}.probability"),
            category.probability.as_ref(),
            ParamKind::Positive,
        );
        let id = match category.id.as_deref().map(str::trim) {
            Some("") => {
                issues.push(GenerationIssue::configuration(
                    format!("{path}.id"),
                    "must not be empty",
                ));
                None
            }
            Some(id) => Some(Some(id.to_string())),
            None => Some(None),
        };
        let id = id.filter(|id| {
            let Some(id) = id else {
                return true;
            };
            let unique = seen.insert(id.clone());
            if !unique {
                issues.push(GenerationIssue::configuration(
                    format!("{path}.id"),
                    format!("duplicate category id '{id}'"),
                ));
            }
            unique
        });

        if let (Some(id), Some(name), Some(probability)) = (id, name, probability) {
            categories.push(match id {
                Some(id) => Category {
                    id,
                    name,
                    probability,
                },
                None => Category::new(name, probability),
            });
        }
    }
    if issues.len() != before {
        return None;
    }

    let total: f64 = categories.iter().map(|category| category.probability).sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        warn!(
            categories = categories.len(),
            total, "category probabilities do not sum to 1; using them as relative weights"
        );
    }
    Some(categories)
}

/// Read a required numeric field, recording an issue when it is absent,
/// not a number, or outside what `kind` allows.
pub fn read_number(
    issues: &mut GenerationErrors,
    path: &str,
    value: Option<&Value>,
    kind: ParamKind,
) -> Option<f64> {
    let Some(value) = value else {
        issues.push(GenerationIssue::configuration(path, "is required"));
        return None;
    };
    let Some(number) = value.as_f64() else {
        issues.push(GenerationIssue::configuration(
            path,
            format!("expected a number, got {}", value_kind(value)),
        ));
        return None;
    };
    match validate_kind(kind, number) {
        Ok(()) => Some(number),
        Err(message) => {
            issues.push(GenerationIssue::configuration(path, message));
            None
        }
    }
}

pub fn validate_kind(kind: ParamKind, number: f64) -> Result<(), String> {
    if !number.is_finite() {
        return Err("must be a finite number".to_string());
    }
    match kind {
        ParamKind::Number => Ok(()),
        ParamKind::NonZero if number == 0.0 => Err("must be non-zero".to_string()),
        ParamKind::NonZero => Ok(()),
        ParamKind::Positive if number == 0.0 => Err("must be non-zero".to_string()),
        ParamKind::Positive if number < 0.0 => Err("must be positive".to_string()),
        ParamKind::Positive => Ok(()),
        ParamKind::NonNegative if number < 0.0 => Err("must not be negative".to_string()),
        ParamKind::NonNegative => Ok(()),
        ParamKind::Age if number < 0.0 || number.fract() != 0.0 => {
            Err("must be a whole non-negative number".to_string())
        }
        ParamKind::Age if number > f64::from(MAX_AGE) => {
            Err(format!("must be at most {MAX_AGE}"))
        }
        ParamKind::Age => Ok(()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
