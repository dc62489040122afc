//! Derivation of dependent column values from an existing column.
//!
//! Source values are coerced into the shape a derivation expects before
//! anything is produced; a single bad element fails the whole column.
//!
//! Name and email derivations assume exactly one first and one last token.
//! Middle names and multi-part surnames are dropped, not preserved.

use chrono::{Datelike, Days, Months, NaiveDate};
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};
use synthtab_core::{ColumnValue, DOB_FORMAT};

use crate::errors::{GenerationErrors, GenerationIssue};

/// Stop listing individual bad source values after this many.
const MAX_SOURCE_ISSUES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

impl PersonName {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// Coerce every source value with `parse`, reporting each failure under
/// `path[index]`.
fn coerce_each<T>(
    path: &str,
    values: &[ColumnValue],
    expected: &str,
    parse: impl Fn(&ColumnValue) -> Option<T>,
) -> Result<Vec<T>, GenerationErrors> {
    let mut issues = GenerationErrors::new();
    let mut failed = 0_usize;
    let mut coerced = Vec::with_capacity(values.len());

    for (index, value) in values.iter().enumerate() {
        match parse(value) {
            Some(parsed) => coerced.push(parsed),
            None => {
                failed += 1;
                if failed <= MAX_SOURCE_ISSUES {
                    issues.push(GenerationIssue::correlation_source(
                        format!("{path}[{index}]"),
                        format!("expected {expected}, got '{value}'"),
                    ));
                }
            }
        }
    }

    if failed > MAX_SOURCE_ISSUES {
        issues.push(GenerationIssue::correlation_source(
            path,
            format!("{} more values could not be read", failed - MAX_SOURCE_ISSUES),
        ));
    }
    issues.into_result(coerced)
}

pub fn parse_number(value: &ColumnValue) -> Option<f64> {
    let number = match value {
        ColumnValue::Number(number) => *number,
        ColumnValue::Text(text) => text.trim().parse::<f64>().ok()?,
    };
    number.is_finite().then_some(number)
}

/// Numbers, or strings holding a number (rounded columns store text).
pub fn coerce_numbers(path: &str, values: &[ColumnValue]) -> Result<Vec<f64>, GenerationErrors> {
    coerce_each(path, values, "a number", parse_number)
}

/// Whole, non-negative ages.
pub fn coerce_ages(path: &str, values: &[ColumnValue]) -> Result<Vec<u32>, GenerationErrors> {
    coerce_each(path, values, "a whole non-negative age", |value| {
        let age = parse_number(value)?;
        (age >= 0.0 && age.fract() == 0.0 && age <= f64::from(u32::MAX)).then_some(age as u32)
    })
}

/// `yyyy-MM-dd` dates that are not after `today`.
pub fn coerce_dates(
    path: &str,
    values: &[ColumnValue],
    today: NaiveDate,
) -> Result<Vec<NaiveDate>, GenerationErrors> {
    coerce_each(path, values, "a past date formatted yyyy-MM-dd", |value| {
        let date = NaiveDate::parse_from_str(value.as_str()?.trim(), DOB_FORMAT).ok()?;
        (date <= today).then_some(date)
    })
}

/// Full names split on whitespace; the first two tokens are kept.
pub fn coerce_names(
    path: &str,
    values: &[ColumnValue],
) -> Result<Vec<PersonName>, GenerationErrors> {
    coerce_each(path, values, "a first and last name", |value| {
        let mut tokens = value.as_str()?.split_whitespace();
        let first = tokens.next()?;
        let last = tokens.next()?;
        Some(PersonName::new(first, last))
    })
}

/// Email addresses whose local part is `first.last`.
pub fn coerce_emails(
    path: &str,
    values: &[ColumnValue],
) -> Result<Vec<PersonName>, GenerationErrors> {
    coerce_each(path, values, "an email shaped first.last@domain", |value| {
        name_from_email(value.as_str()?)
    })
}

/// `first.last@domain` with a lowercased local part.
pub fn email_from_name(name: &PersonName, domain: &str) -> String {
    format!(
        "{}.{}@{}",
        name.first.to_lowercase(),
        name.last.to_lowercase(),
        domain
    )
}

/// Split the local part of an email on `.` and title-case both halves.
pub fn name_from_email(email: &str) -> Option<PersonName> {
    let (local, _) = email.trim().split_once('@')?;
    let mut parts = local.split('.');
    let first = parts.next().filter(|part| !part.is_empty())?;
    let last = parts.next().filter(|part| !part.is_empty())?;
    Some(PersonName::new(title_case(first), title_case(last)))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whole years elapsed between `dob` and `today`.
pub fn years_since(dob: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

pub fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(years.checked_mul(12)?))
}

/// Uniform date in `[earliest, latest]`.
pub fn random_date_between(
    earliest: NaiveDate,
    latest: NaiveDate,
    rng: &mut dyn RngCore,
) -> NaiveDate {
    let span = (latest - earliest).num_days().max(0) as u64;
    let offset = rng.random_range(0..=span);
    earliest
        .checked_add_days(Days::new(offset))
        .unwrap_or(latest)
}

/// Birth date inside the one-year window ending `age` years before `today`.
///
/// The window spans one year and one day, so the age recomputed from the
/// result is `age` or `age + 1`.
pub fn dob_from_age(age: u32, today: NaiveDate, rng: &mut dyn RngCore) -> Option<NaiveDate> {
    let latest = years_before(today, age)?;
    let earliest = years_before(latest, 1)?.pred_opt()?;
    Some(random_date_between(earliest, latest, rng))
}

/// `source * gradient + intercept` plus gaussian noise, index for index.
pub fn linear_with_noise(
    source: &[f64],
    gradient: f64,
    intercept: f64,
    noise: &Normal<f64>,
    rng: &mut dyn RngCore,
) -> Vec<f64> {
    source
        .iter()
        .map(|value| value * gradient + intercept + noise.sample(rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn years_since_counts_only_completed_birthdays() {
        let today = date(2024, 6, 15);
        assert_eq!(years_since(date(1990, 6, 15), today), 34);
        assert_eq!(years_since(date(1990, 6, 16), today), 33);
        assert_eq!(years_since(date(2024, 1, 1), today), 0);
    }

    #[test]
    fn email_local_part_splits_into_title_cased_name() {
        assert_eq!(
            name_from_email("jane.doe@example.com"),
            Some(PersonName::new("Jane", "Doe"))
        );
        assert_eq!(name_from_email("jane@example.com"), None);
        assert_eq!(name_from_email("jane.doe"), None);
    }

    #[test]
    fn names_keep_only_first_two_tokens() {
        let values = vec![ColumnValue::from("Mary Ann Smith")];
        let names = coerce_names("source", &values).expect("coerce names");
        assert_eq!(names, vec![PersonName::new("Mary", "Ann")]);
    }

    #[test]
    fn numeric_strings_are_accepted_as_numbers() {
        let values = vec![ColumnValue::from(" 2.50"), ColumnValue::Number(3.0)];
        assert_eq!(
            coerce_numbers("source", &values).expect("coerce"),
            vec![2.5, 3.0]
        );
    }

    #[test]
    fn source_issues_are_capped() {
        let values = vec![ColumnValue::from("x"); 25];
        let errors = coerce_numbers("source", &values).expect_err("all values are bad");
        assert_eq!(errors.len(), MAX_SOURCE_ISSUES + 1);
        assert!(errors.messages()[MAX_SOURCE_ISSUES].contains("15 more values"));
    }
}
