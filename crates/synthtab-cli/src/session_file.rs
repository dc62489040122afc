//! Session files: the ordered list of columns a run generates.
//!
//! TOML by default, JSON when the file ends in `.json`.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use synthtab_generate::{
    GenerateOptions, GenerationEngine, GenerationErrors, GeneratorConfiguration, LocaleKey,
    Session,
};
use tracing::info;

use crate::CliError;
use crate::settings::CliSettings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFile {
    /// Overrides the settings seed.
    pub seed: Option<u64>,
    /// Overrides the settings locale.
    pub locale: Option<LocaleKey>,
    /// Reference date for age arithmetic.
    pub today: Option<NaiveDate>,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default)]
    pub samples: Option<usize>,
    #[serde(default)]
    pub config: GeneratorConfiguration,
}

impl SessionFile {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Self::from_toml(&content)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Engine options; a command-line seed beats the file, which beats settings.
    pub fn options(&self, settings: &CliSettings, seed: Option<u64>) -> GenerateOptions {
        GenerateOptions {
            seed: seed.or(self.seed).or(settings.seed),
            locale: self.locale.unwrap_or(settings.locale),
            today: self.today,
        }
    }

    /// Generate the columns in order into a fresh session.
    ///
    /// Columns without a sample count use the settings default. The first
    /// rejected column stops the build.
    pub fn build(&self, settings: &CliSettings, seed: Option<u64>) -> Result<Session, CliError> {
        let options = self.options(settings, seed);
        info!(
            columns = self.columns.len(),
            seed = ?options.seed,
            locale = %options.locale,
            "building session"
        );
        let engine = GenerationEngine::new(options);

        let mut session = Session::new();
        for (position, spec) in self.columns.iter().enumerate() {
            let index = if position == 0 {
                0
            } else {
                session.add_new_column()
            };
            let rejected = |errors: GenerationErrors| CliError::Rejected {
                column: spec.name.clone(),
                errors,
            };
            session.set_column_name(index, &spec.name).map_err(rejected)?;
            let samples = spec.samples.unwrap_or(settings.default_samples);
            session
                .generate_column(index, samples, &spec.config, &engine)
                .map_err(rejected)?;
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use synthtab_core::ColumnType;

    use super::*;

    #[test]
    fn toml_leaves_stay_loose_until_validation() {
        let session = SessionFile::from_toml(
            r#"
seed = 7
today = "2024-06-15"

[[columns]]
name = "weight"
samples = 20

[columns.config]
columnType = "gamma"
gamma = { mean = 70, standardDeviation = "wide" }
rounding = { type = "decimal", value = 1 }
"#,
        )
        .expect("parse session");

        assert_eq!(session.seed, Some(7));
        let column = &session.columns[0];
        assert_eq!(column.samples, Some(20));
        assert_eq!(column.config.column_type, Some(ColumnType::Gamma));
        assert_eq!(column.config.gamma.mean, Some(json!(70)));
        assert_eq!(column.config.gamma.standard_deviation, Some(json!("wide")));
        assert_eq!(column.config.rounding.kind, Some(json!("decimal")));
    }

    #[test]
    fn demo_session_generates_every_column() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/people.toml");
        let file = SessionFile::load(&path).expect("load demo session");
        let session = file
            .build(&CliSettings::default(), None)
            .unwrap_or_else(|err| panic!("demo rejected: {err}"));

        let records = session.csv_records();
        assert_eq!(records[0].len(), file.columns.len());
        assert_eq!(records.len(), 51);

        let again = file.build(&CliSettings::default(), None).expect("rebuild");
        assert_eq!(again.csv_records(), records);
    }

    #[test]
    fn command_line_seed_beats_file_and_settings() {
        let settings = CliSettings {
            seed: Some(1),
            locale: LocaleKey::PtBr,
            ..CliSettings::default()
        };
        let mut file = SessionFile::default();
        assert_eq!(file.options(&settings, None).seed, Some(1));
        assert_eq!(file.options(&settings, None).locale, LocaleKey::PtBr);

        file.seed = Some(2);
        file.locale = Some(LocaleKey::EnUs);
        assert_eq!(file.options(&settings, None).seed, Some(2));
        assert_eq!(file.options(&settings, None).locale, LocaleKey::EnUs);
        assert_eq!(file.options(&settings, Some(3)).seed, Some(3));
    }

    #[test]
    fn columns_without_samples_use_the_settings_default() {
        let file = SessionFile::from_toml(
            r#"
seed = 5

[[columns]]
name = "score"
config = { columnType = "uniform", uniform = { min = 0, max = 10 } }

[[columns]]
name = "tier"
samples = 3
config = { columnType = "uniform", uniform = { min = 0, max = 1 } }
"#,
        )
        .expect("parse session");
        let settings = CliSettings {
            default_samples: 7,
            ..CliSettings::default()
        };

        let session = file.build(&settings, None).expect("build");
        let lengths: Vec<Option<usize>> =
            session.columns().iter().map(|column| column.len()).collect();
        assert_eq!(lengths, vec![Some(7), Some(3)]);
    }

    #[test]
    fn rejected_column_is_named_in_the_error() {
        let file = SessionFile::from_toml(
            r#"
[[columns]]
name = "broken"
config = { columnType = "gamma" }
"#,
        )
        .expect("parse session");

        match file.build(&CliSettings::default(), Some(1)) {
            Err(CliError::Rejected { column, errors }) => {
                assert_eq!(column, "broken");
                assert_eq!(errors.len(), 2);
            }
            other => panic!("expected a rejected column, got {other:?}"),
        }
    }
}
