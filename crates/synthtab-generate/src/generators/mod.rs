use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::RngCore;
use synthtab_core::{ColumnType, ColumnValue, GeneratedColumn};

use crate::config::GeneratorConfiguration;
use crate::errors::{GenerationErrors, GenerationIssue};
use crate::faker_rs::LocaleKey;
use crate::params::{self, ValidatedParameters};

pub mod primitives;
pub mod semantic;

/// Inputs shared by every generator call.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext {
    /// Requested sample count; ignored once a correlation source is selected.
    pub samples: usize,
    pub locale: LocaleKey,
    pub today: NaiveDate,
}

/// Produces the values of one column type.
pub trait Generator: Send + Sync {
    fn column_type(&self) -> ColumnType;

    /// Turn the configuration bag into this generator's parameters.
    fn validate(
        &self,
        config: &GeneratorConfiguration,
        columns: &[GeneratedColumn],
        ctx: &GeneratorContext,
    ) -> Result<ValidatedParameters, GenerationErrors> {
        params::validate(self.column_type(), config, columns, ctx.today)
    }

    fn generate(
        &self,
        params: &ValidatedParameters,
        ctx: &GeneratorContext,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ColumnValue>, GenerationErrors>;
}

/// Issue returned when a generator receives another type's parameters.
pub(crate) fn mismatched(expected: ColumnType, params: &ValidatedParameters) -> GenerationErrors {
    GenerationIssue::internal(format!(
        "{expected} generator received {} parameters",
        params.column_type()
    ))
    .into()
}

/// Generators keyed by the column type they produce.
pub struct GeneratorRegistry {
    generators: BTreeMap<ColumnType, Box<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            generators: BTreeMap::new(),
        };
        primitives::register(&mut registry);
        semantic::register(&mut registry);
        registry
    }

    /// Register a generator, replacing any previous one for its column type.
    pub fn register_generator(&mut self, generator: Box<dyn Generator>) {
        self.generators.insert(generator.column_type(), generator);
    }

    pub fn generator(&self, column_type: ColumnType) -> Option<&dyn Generator> {
        self.generators.get(&column_type).map(|generator| generator.as_ref())
    }

    pub fn column_types(&self) -> impl Iterator<Item = ColumnType> + '_ {
        self.generators.keys().copied()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("column_types", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}
