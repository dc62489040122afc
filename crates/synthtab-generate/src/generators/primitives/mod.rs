use rand::distr::weighted::WeightedIndex;
use rand::distr::{Distribution, Uniform};
use rand::{Rng, RngCore};
use rand_distr::{Gamma, Normal};
use synthtab_core::{ColumnType, ColumnValue, DOB_FORMAT};

use crate::correlate::{
    dob_from_age, linear_with_noise, random_date_between, years_before, years_since,
};
use crate::errors::{GenerationErrors, GenerationIssue};
use crate::generators::{Generator, GeneratorContext, GeneratorRegistry, mismatched};
use crate::params::{AgeRangeParams, Derivation, ValidatedParameters};
use crate::rounding;

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register_generator(Box::new(AgeGenerator));
    registry.register_generator(Box::new(DobGenerator));
    registry.register_generator(Box::new(CorrelatedGenerator));
    registry.register_generator(Box::new(GammaGenerator));
    registry.register_generator(Box::new(UniformGenerator));
    registry.register_generator(Box::new(NormalGenerator));
    registry.register_generator(Box::new(CategoricalGenerator));
}

fn distribution_issue(path: &str, err: impl std::fmt::Display) -> GenerationErrors {
    GenerationIssue::configuration(path, format!("invalid distribution parameters: {err}")).into()
}

/// Reject draws that overflowed the floating point range.
fn finite(path: &str, values: Vec<f64>) -> Result<Vec<f64>, GenerationErrors> {
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(GenerationIssue::configuration(
            path,
            format!(
                "value {index} is {}; the parameters are too large to represent",
                values[index]
            ),
        )
        .into()),
        None => Ok(values),
    }
}

struct AgeGenerator;

impl Generator for AgeGenerator {
    fn column_type(&self) -> ColumnType {
        ColumnType::Age
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors> {
        let ValidatedParameters::Age(derivation) = params else {
            return Err(mismatched(self.column_type(), params));
        };
        let ages = match derivation {
            Derivation::Independent(AgeRangeParams { min, max }) => (0..ctx.samples)
                .map(|_| rng.random_range(*min..=*max))
                .collect::<Vec<_>>(),
            Derivation::Correlated(dates) => dates
                .iter()
                .map(|dob| years_since(*dob, ctx.today))
                .collect(),
        };
        Ok(ages
            .into_iter()
            .map(|age| ColumnValue::Number(f64::from(age)))
            .collect())
    }
}

struct DobGenerator;

impl Generator for DobGenerator {
    fn column_type(&self) -> ColumnType {
        ColumnType::Dob
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors> {
        let ValidatedParameters::Dob(derivation) = params else {
            return Err(mismatched(self.column_type(), params));
        };
        let dates = match derivation {
            Derivation::Independent(AgeRangeParams { min, max }) => {
                // Born on or before today - min years, after today - (max + 1) years.
                let latest = years_before(ctx.today, *min);
                let earliest = max
                    .checked_add(1)
                    .and_then(|oldest| years_before(ctx.today, oldest))
                    .and_then(|date| date.succ_opt());
                let (Some(earliest), Some(latest)) = (earliest, latest) else {
                    return Err(GenerationIssue::configuration(
                        "ageRange",
                        "birth dates fall outside the supported calendar",
                    )
                    .into());
                };
                (0..ctx.samples)
                    .map(|_| random_date_between(earliest, latest, rng))
                    .collect::<Vec<_>>()
            }
            Derivation::Correlated(ages) => {
                let mut dates = Vec::with_capacity(ages.len());
                for (index, age) in ages.iter().enumerate() {
                    let Some(date) = dob_from_age(*age, ctx.today, rng) else {
                        return Err(GenerationIssue::correlation_source(
                            format!("ageRange.correlatesTo.values[{index}]"),
                            format!("age {age} is too large to derive a birth date"),
                        )
                        .into());
                    };
                    dates.push(date);
                }
                dates
            }
        };
        Ok(dates
            .into_iter()
            .map(|date| ColumnValue::Text(date.format(DOB_FORMAT).to_string()))
            .collect())
    }
}

struct CorrelatedGenerator;

impl Generator for CorrelatedGenerator {
    fn column_type(&self) -> ColumnType {
        ColumnType::Correlated
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        _ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors> {
        let ValidatedParameters::Correlated(params) = params else {
            return Err(mismatched(self.column_type(), params));
        };
        let noise = Normal::new(params.loc, params.standard_deviation)
            .map_err(|err| distribution_issue("correlated", err))?;
        let values = linear_with_noise(
            &params.source,
            params.gradient,
            params.intercept,
            &noise,
            rng,
        );
        let values = finite("correlated", values)?;
        Ok(rounding::apply_all(params.rounding.as_ref(), values))
    }
}

struct GammaGenerator;

impl Generator for GammaGenerator {
    fn column_type(&self) -> ColumnType {
        ColumnType::Gamma
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors> {
        let ValidatedParameters::Gamma(params) = params else {
            return Err(mismatched(self.column_type(), params));
        };
        let gamma = Gamma::new(params.shape(), params.scale())
            .map_err(|err| distribution_issue("gamma", err))?;
        let values = finite("gamma", (0..ctx.samples).map(|_| gamma.sample(rng)).collect())?;
        Ok(rounding::apply_all(params.rounding.as_ref(), values))
    }
}

struct UniformGenerator;

impl Generator for UniformGenerator {
    fn column_type(&self) -> ColumnType {
        ColumnType::Uniform
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors> {
        let ValidatedParameters::Uniform(params) = params else {
            return Err(mismatched(self.column_type(), params));
        };
        let uniform = Uniform::new_inclusive(params.min, params.max)
            .map_err(|err| distribution_issue("uniform", err))?;
        let values = finite("uniform", (0..ctx.samples).map(|_| uniform.sample(rng)).collect())?;
        Ok(rounding::apply_all(params.rounding.as_ref(), values))
    }
}

struct NormalGenerator;

impl Generator for NormalGenerator {
    fn column_type(&self) -> ColumnType {
        ColumnType::Normal
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors> {
        let ValidatedParameters::Normal(params) = params else {
            return Err(mismatched(self.column_type(), params));
        };
        let normal = Normal::new(params.mean, params.standard_deviation)
            .map_err(|err| distribution_issue("normal", err))?;
        let values = finite("normal", (0..ctx.samples).map(|_| normal.sample(rng)).collect())?;
        Ok(rounding::apply_all(params.rounding.as_ref(), values))
    }
}

struct CategoricalGenerator;

impl Generator for CategoricalGenerator {
    fn column_type(&self) -> ColumnType {
        ColumnType::Categorical
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors> {
        let ValidatedParameters::Categorical(categories) = params else {
            return Err(mismatched(self.column_type(), params));
        };
        let weights = WeightedIndex::new(categories.iter().map(|category| category.probability))
            .map_err(|err| distribution_issue("categorical.categories", err))?;
        Ok((0..ctx.samples)
            .map(|_| ColumnValue::Text(categories[weights.sample(rng)].name.clone()))
            .collect())
    }
}
