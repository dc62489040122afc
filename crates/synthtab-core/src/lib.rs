//! Core contracts for synthtab.
//!
//! This crate defines the column data model shared by the generation engine
//! and the CLI: column types, generated and uploaded columns, headers,
//! categories and the helpers that turn a column list into tabular rows.

pub mod category;
pub mod column;
pub mod error;
pub mod table;

pub use category::Category;
pub use column::{Column, ColumnType, ColumnValue, GeneratedColumn, Header, UnknownColumn};
pub use error::{Error, Result};
pub use table::{from_table, longest_column_len, to_csv_records, to_rows};

/// Date format used for every date-of-birth value.
pub const DOB_FORMAT: &str = "%Y-%m-%d";
