//! Post-generation formatting of numeric values.
//!
//! Rounding only changes how a value is represented: it runs after every
//! statistical computation and turns the number into its formatted string.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use synthtab_core::ColumnValue;

/// Largest digit count accepted for either rounding kind.
pub const MAX_ROUNDING_DIGITS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoundingKind {
    /// Fixed number of significant digits.
    Significant,
    /// Fixed number of decimal places.
    Decimal,
}

impl RoundingKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "significant" => Some(Self::Significant),
            "decimal" => Some(Self::Decimal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Significant => "significant",
            Self::Decimal => "decimal",
        }
    }

    /// Smallest digit count accepted for this kind.
    pub fn min_digits(self) -> u32 {
        match self {
            Self::Significant => 1,
            Self::Decimal => 0,
        }
    }
}

/// Validated rounding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundingParams {
    pub kind: RoundingKind,
    pub digits: u32,
}

impl RoundingParams {
    pub fn format(&self, value: f64) -> String {
        match self.kind {
            RoundingKind::Significant => to_precision(value, self.digits),
            RoundingKind::Decimal => to_fixed(value, self.digits),
        }
    }
}

/// Apply an optional rounding rule; without one the value stays a number.
pub fn apply(rounding: Option<&RoundingParams>, value: f64) -> ColumnValue {
    match rounding {
        Some(rounding) => ColumnValue::Text(rounding.format(value)),
        None => ColumnValue::Number(value),
    }
}

pub fn apply_all(rounding: Option<&RoundingParams>, values: Vec<f64>) -> Vec<ColumnValue> {
    values
        .into_iter()
        .map(|value| apply(rounding, value))
        .collect()
}

/// Format with `digits` places after the decimal point.
pub fn to_fixed(value: f64, digits: u32) -> String {
    let digits = digits as usize;
    format!("{value:.digits$}")
}

/// Format with `digits` significant digits.
///
/// Switches to exponent notation (`1.23e+25`) when the decimal exponent is
/// below -6 or not smaller than `digits`, otherwise uses fixed notation.
pub fn to_precision(value: f64, digits: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = digits.max(1) as usize;
    let mantissa_digits = digits - 1;

    // Scientific formatting rounds first, so the exponent already accounts
    // for carries such as 9.99 -> 1.0e1.
    let scientific = format!("{value:.mantissa_digits$e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -6 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{}", exponent.abs());
    }

    let decimals = (mantissa_digits as i32 - exponent).max(0) as usize;
    format!("{value:.decimals$}")
}
