//! In-memory column list owned by one interactive session.

use synthtab_core::{
    Column, ColumnType, ColumnValue, GeneratedColumn, Header, from_table, to_csv_records, to_rows,
};
use tracing::{debug, info};

use crate::config::GeneratorConfiguration;
use crate::engine::GenerationEngine;
use crate::errors::{GenerationErrors, GenerationIssue};

/// Name given to the placeholder column a new session starts with.
pub const DEFAULT_COLUMN_NAME: &str = "Header";

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    columns: Vec<Column>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            columns: vec![Column::empty(DEFAULT_COLUMN_NAME)],
        }
    }

    /// Session whose columns come from an uploaded table (header row first).
    pub fn from_table(rows: &[Vec<String>]) -> synthtab_core::Result<Self> {
        let columns = from_table(rows)?.into_iter().map(Column::from).collect();
        Ok(Self { columns })
    }

    /// Replace every column with the columns of an uploaded table.
    pub fn load_table(&mut self, rows: &[Vec<String>]) -> synthtab_core::Result<()> {
        *self = Self::from_table(rows)?;
        info!(columns = self.columns.len(), "table loaded");
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Append a placeholder column named after the first free default name
    /// ("Header", "Header 2", ...).
    pub fn add_new_column(&mut self) -> usize {
        let name = (1..)
            .map(|n| match n {
                1 => DEFAULT_COLUMN_NAME.to_string(),
                n => format!("{DEFAULT_COLUMN_NAME} {n}"),
            })
            .find(|name| self.position_of(name).is_none())
            .unwrap_or_else(|| DEFAULT_COLUMN_NAME.to_string());
        self.columns.push(Column::empty(name));
        self.columns.len() - 1
    }

    pub fn delete_column(&mut self, index: usize) -> Result<Column, GenerationErrors> {
        self.check_index(index)?;
        Ok(self.columns.remove(index))
    }

    pub fn set_column_name(
        &mut self,
        index: usize,
        name: impl Into<String>,
    ) -> Result<(), GenerationErrors> {
        self.check_index(index)?;
        let name = name.into();
        if let Some(other) = self.position_of(&name).filter(|other| *other != index) {
            return Err(GenerationIssue::configuration(
                "name",
                format!("column name '{name}' is already used by column {other}"),
            )
            .into());
        }
        self.columns[index].set_name(name);
        Ok(())
    }

    pub fn generated_columns(&self) -> Vec<GeneratedColumn> {
        self.columns
            .iter()
            .filter_map(Column::as_generated)
            .cloned()
            .collect()
    }

    /// Generated columns of `column_type`, offered as correlation sources.
    pub fn columns_for_type(&self, column_type: ColumnType) -> Vec<&GeneratedColumn> {
        self.columns
            .iter()
            .filter_map(Column::as_generated)
            .filter(|column| column.column_type == column_type)
            .collect()
    }

    /// Generated numeric columns, offered as sources of correlated columns.
    pub fn numeric_columns(&self) -> Vec<&GeneratedColumn> {
        self.columns
            .iter()
            .filter_map(Column::as_generated)
            .filter(|column| column.column_type.is_numeric())
            .collect()
    }

    /// Generate the column at `index` and commit it only on success.
    ///
    /// The column keeps its current name; the other columns are passed to the
    /// engine as correlation candidates.
    pub fn generate_column(
        &mut self,
        index: usize,
        samples: usize,
        config: &GeneratorConfiguration,
        engine: &GenerationEngine,
    ) -> Result<&GeneratedColumn, GenerationErrors> {
        self.check_index(index)?;
        let sources: Vec<GeneratedColumn> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != index)
            .filter_map(|(_, column)| column.as_generated().cloned())
            .collect();

        let output = engine.generate(samples, &sources, config)?;
        let name = self.columns[index].name().to_string();
        debug!(index, name = %name, values = output.values.len(), "committing column");
        self.columns[index] = Column::Generated(output.into_column(name));
        match &self.columns[index] {
            Column::Generated(column) => Ok(column),
            _ => Err(GenerationIssue::internal(format!("column {index} was not committed")).into()),
        }
    }

    pub fn headers(&self) -> Vec<Header> {
        self.columns.iter().map(Column::header).collect()
    }

    pub fn preview_rows(&self) -> Vec<Vec<Option<ColumnValue>>> {
        to_rows(&self.columns)
    }

    pub fn csv_records(&self) -> Vec<Vec<String>> {
        to_csv_records(&self.columns)
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name() == name)
    }

    fn check_index(&self, index: usize) -> Result<(), GenerationErrors> {
        if index < self.columns.len() {
            Ok(())
        } else {
            Err(GenerationIssue::internal(format!(
                "column index {index} out of range for {} columns",
                self.columns.len()
            ))
            .into())
        }
    }
}
