//! Column generation engine for synthtab.
//!
//! A loosely typed [`GeneratorConfiguration`] is validated into strict
//! parameters for one column type, values are drawn independently or derived
//! from an existing column, and numeric output is optionally rounded.

pub mod config;
pub mod correlate;
pub mod engine;
pub mod errors;
pub mod faker_rs;
pub mod generators;
pub mod model;
pub mod output;
pub mod params;
pub mod rounding;
pub mod session;
pub mod synthesize;

pub use config::GeneratorConfiguration;
pub use engine::GenerationEngine;
pub use errors::{GenerationError, GenerationErrors, GenerationIssue, IssueKind};
pub use faker_rs::LocaleKey;
pub use generators::{Generator, GeneratorContext, GeneratorRegistry};
pub use model::{GenerateOptions, GenerationOutput};
pub use params::ValidatedParameters;
pub use rounding::{RoundingKind, RoundingParams};
pub use session::Session;
pub use synthesize::{
    SynthesisError, SynthesisRequest, SynthesisResponse, SynthesisService, synthesize_csv,
};
