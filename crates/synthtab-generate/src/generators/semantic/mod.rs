use rand::RngCore;
use synthtab_core::{ColumnType, ColumnValue};

use crate::correlate::{PersonName, email_from_name};
use crate::errors::GenerationErrors;
use crate::faker_rs::{FakeRsAdapter, LocaleKey};
use crate::generators::{Generator, GeneratorContext, GeneratorRegistry, mismatched};
use crate::params::{Derivation, ValidatedParameters};

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register_generator(Box::new(NameGenerator));
    registry.register_generator(Box::new(EmailGenerator));
    registry.register_generator(Box::new(AddressGenerator));
}

fn fake_name(locale: LocaleKey, rng: &mut dyn RngCore) -> PersonName {
    PersonName::new(
        FakeRsAdapter::first_name(locale, rng),
        FakeRsAdapter::last_name(locale, rng),
    )
}

struct NameGenerator;

impl Generator for NameGenerator {
    fn column_type(&self) -> ColumnType {
        ColumnType::Name
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors> {
        let ValidatedParameters::Name(derivation) = params else {
            return Err(mismatched(self.column_type(), params));
        };
        let names = match derivation {
            Derivation::Independent(()) => (0..ctx.samples)
                .map(|_| fake_name(ctx.locale, rng))
                .collect(),
            Derivation::Correlated(names) => names.clone(),
        };
        Ok(names
            .iter()
            .map(|name| ColumnValue::Text(name.full_name()))
            .collect())
    }
}

struct EmailGenerator;

impl Generator for EmailGenerator {
    fn column_type(&self) -> ColumnType {
        ColumnType::Email
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors> {
        let ValidatedParameters::Email(derivation) = params else {
            return Err(mismatched(self.column_type(), params));
        };
        let values = match derivation {
            Derivation::Independent(()) => (0..ctx.samples)
                .map(|_| {
                    let name = fake_name(ctx.locale, rng);
                    let domain = FakeRsAdapter::email_domain(ctx.locale, rng);
                    email_from_name(&name, &domain)
                })
                .collect::<Vec<_>>(),
            Derivation::Correlated(names) => names
                .iter()
                .map(|name| email_from_name(name, &FakeRsAdapter::email_domain(ctx.locale, rng)))
                .collect(),
        };
        Ok(values.into_iter().map(ColumnValue::Text).collect())
    }
}

struct AddressGenerator;

impl Generator for AddressGenerator {
    fn column_type(&self) -> ColumnType {
        ColumnType::Address
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors> {
        if !matches!(params, ValidatedParameters::Address) {
            return Err(mismatched(self.column_type(), params));
        }
        Ok((0..ctx.samples)
            .map(|_| {
                let street = FakeRsAdapter::street_address(ctx.locale, rng);
                let city = FakeRsAdapter::city(ctx.locale, rng);
                let post_code = FakeRsAdapter::post_code(ctx.locale, rng);
                ColumnValue::Text(format!("{street}, {city}, {post_code}"))
            })
            .collect())
    }
}
