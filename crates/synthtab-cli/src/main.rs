mod atomic;
mod logging;
mod session_file;
mod settings;

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use synthtab_core::{ColumnType, Header};
use synthtab_generate::output::csv::to_csv_string;
use synthtab_generate::{GenerationError, GenerationErrors, GeneratorConfiguration, Session};
use thiserror::Error;
use tracing::{error, info};

use atomic::write_bytes_atomic;
use logging::init_logging;
use session_file::SessionFile;
use settings::{SETTINGS_FILE, load_settings};

#[derive(Debug, Error)]
enum CliError {
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("column '{column}' was rejected: {errors}")]
    Rejected {
        column: String,
        errors: GenerationErrors,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "synthtab", version, about = "Synthetic tabular data generator")]
struct Cli {
    /// Append JSON logs to this file instead of logging to stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate every column of a session file and export CSV.
    Generate(GenerateArgs),
    /// Print the generated table with blank cells for missing values.
    Preview(PreviewArgs),
    /// List column types and their correlation sources.
    Types,
    /// Print the JSON Schema of a column configuration.
    Schema,
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Session file (TOML, or JSON with a .json extension).
    #[arg(value_name = "SESSION")]
    session: PathBuf,
    /// Seed for reproducible output; overrides settings and session file.
    #[arg(long)]
    seed: Option<u64>,
    /// Settings file.
    #[arg(long, default_value = SETTINGS_FILE)]
    settings: PathBuf,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    session: SessionArgs,
    /// Output CSV path; stdout when absent.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    session: SessionArgs,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.log_file.as_deref()) {
        eprintln!("{err}");
        std::process::exit(2);
    }

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Preview(args) => run_preview(args),
        Command::Types => run_types(),
        Command::Schema => run_schema(),
    };

    if let Err(err) = result {
        if let CliError::Rejected { errors, .. } = &err {
            for message in errors.messages() {
                eprintln!("  - {message}");
            }
        }
        error!(error = %err, "command failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let session = build_session(&args.session)?;
    let csv = to_csv_string(session.columns()).map_err(GenerationError::from)?;

    match args.out {
        Some(path) => {
            write_bytes_atomic(&path, csv.as_bytes())?;
            info!(path = %path.display(), bytes = csv.len(), "csv written");
        }
        None => std::io::stdout().write_all(csv.as_bytes())?,
    }
    Ok(())
}

fn run_preview(args: PreviewArgs) -> Result<(), CliError> {
    let session = build_session(&args.session)?;
    let headers: Vec<String> = session.headers().iter().map(header_label).collect();

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", headers.join("\t"))?;
    for row in session.preview_rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| cell.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect();
        writeln!(stdout, "{}", cells.join("\t"))?;
    }
    Ok(())
}

fn run_types() -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    for column_type in ColumnType::ALL {
        let source = match column_type {
            ColumnType::Correlated => "any numeric column".to_string(),
            other => other
                .correlation_source()
                .map(|source| format!("{source} column"))
                .unwrap_or_else(|| "-".to_string()),
        };
        writeln!(stdout, "{column_type}\t{source}")?;
    }
    Ok(())
}

fn run_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(GeneratorConfiguration);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Load settings and the session file, then generate every column.
fn build_session(args: &SessionArgs) -> Result<Session, CliError> {
    let settings = load_settings(&args.settings)?;
    let file = SessionFile::load(&args.session)?;
    info!(session = %args.session.display(), "loaded session file");
    file.build(&settings, args.seed)
}

fn header_label(header: &Header) -> String {
    match header {
        Header::Generated { name, column_type } => format!("{name} ({column_type})"),
        other => other.name().to_string(),
    }
}
