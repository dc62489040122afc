use thiserror::Error;

/// Core error type shared across synthtab crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A column type name that is not part of the closed enumeration.
    #[error("unknown column type: {0}")]
    UnknownColumnType(String),
    /// The uploaded table has no header row.
    #[error("table is empty: a header row is required")]
    EmptyTable,
}

/// Convenience alias for results returned by synthtab crates.
pub type Result<T> = std::result::Result<T, Error>;
