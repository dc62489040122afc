use std::time::Instant;

use chrono::NaiveDate;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use synthtab_core::{ColumnType, GeneratedColumn};
use tracing::{info, warn};

use crate::config::GeneratorConfiguration;
use crate::errors::{GenerationErrors, GenerationIssue};
use crate::generators::{GeneratorContext, GeneratorRegistry};
use crate::model::{GenerateOptions, GenerationOutput};
use crate::params::ValidatedParameters;

/// Entry point for generating one column from a configuration.
///
/// The engine never mutates the columns it is given; committing the output is
/// left to the caller.
#[derive(Debug)]
pub struct GenerationEngine {
    options: GenerateOptions,
    registry: GeneratorRegistry,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self::with_registry(options, GeneratorRegistry::new())
    }

    pub fn with_registry(options: GenerateOptions, registry: GeneratorRegistry) -> Self {
        Self { options, registry }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    pub fn today(&self) -> NaiveDate {
        self.options
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Validate and generate one column.
    ///
    /// With a seed, the random stream depends on the seed, the column type and
    /// how many columns already exist.
    pub fn generate(
        &self,
        samples: usize,
        columns: &[GeneratedColumn],
        config: &GeneratorConfiguration,
    ) -> Result<GenerationOutput, GenerationErrors> {
        let mut rng = self.rng_for(config.column_type, columns.len());
        self.generate_with_rng(samples, columns, config, &mut rng)
    }

    pub fn generate_with_rng(
        &self,
        samples: usize,
        columns: &[GeneratedColumn],
        config: &GeneratorConfiguration,
        rng: &mut dyn RngCore,
    ) -> Result<GenerationOutput, GenerationErrors> {
        let start = Instant::now();
        let Some(column_type) = config.column_type else {
            warn!("generation requested without a column type");
            return Err(GenerationIssue::internal("No column type selected").into());
        };
        info!(column_type = %column_type, samples, "generation started");

        let result = self.run(column_type, samples, columns, config, rng);
        match &result {
            Ok((params, output)) => info!(
                column_type = %column_type,
                values = output.values.len(),
                correlated = params.is_correlated(),
                duration_ms = start.elapsed().as_millis() as u64,
                "column generated"
            ),
            Err(errors) => warn!(
                column_type = %column_type,
                issues = errors.len(),
                internal = errors.has_internal(),
                "generation rejected"
            ),
        }
        result.map(|(_, output)| output)
    }

    /// Run validation only, without drawing any value.
    pub fn validate(
        &self,
        samples: usize,
        columns: &[GeneratedColumn],
        config: &GeneratorConfiguration,
    ) -> Result<ValidatedParameters, GenerationErrors> {
        let Some(column_type) = config.column_type else {
            return Err(GenerationIssue::internal("No column type selected").into());
        };
        let generator = self.registry.generator(column_type).ok_or_else(|| {
            GenerationIssue::internal(format!("no generator registered for {column_type}"))
        })?;
        generator.validate(config, columns, &self.context(samples))
    }

    fn run(
        &self,
        column_type: ColumnType,
        samples: usize,
        columns: &[GeneratedColumn],
        config: &GeneratorConfiguration,
        rng: &mut dyn RngCore,
    ) -> Result<(ValidatedParameters, GenerationOutput), GenerationErrors> {
        let generator = self.registry.generator(column_type).ok_or_else(|| {
            GenerationIssue::internal(format!("no generator registered for {column_type}"))
        })?;
        let ctx = self.context(samples);
        let params = generator.validate(config, columns, &ctx)?;
        let values = generator.generate(&params, &ctx, rng)?;
        Ok((
            params,
            GenerationOutput {
                column_type,
                values,
            },
        ))
    }

    fn context(&self, samples: usize) -> GeneratorContext {
        GeneratorContext {
            samples,
            locale: self.options.locale,
            today: self.today(),
        }
    }

    fn rng_for(&self, column_type: Option<ColumnType>, position: usize) -> ChaCha8Rng {
        match self.options.seed {
            Some(seed) => {
                let key = match column_type {
                    Some(column_type) => format!("{column_type}#{position}"),
                    None => format!("#{position}"),
                };
                ChaCha8Rng::seed_from_u64(hash_seed(seed, &key))
            }
            None => ChaCha8Rng::from_os_rng(),
        }
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
