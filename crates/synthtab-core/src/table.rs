use crate::column::{Column, ColumnValue, UnknownColumn};
use crate::error::{Error, Result};

/// Turn raw table rows (header first) into untyped columns.
///
/// Rows may be ragged: a cell beyond the header gets an empty column name and
/// holes before a cell are filled with empty strings so indices stay aligned.
pub fn from_table(rows: &[Vec<String>]) -> Result<Vec<UnknownColumn>> {
    let (names, data) = rows.split_first().ok_or(Error::EmptyTable)?;
    let mut columns: Vec<UnknownColumn> = names
        .iter()
        .map(|name| UnknownColumn {
            name: name.clone(),
            values: Vec::new(),
        })
        .collect();

    for (row_index, row) in data.iter().enumerate() {
        for (column_index, cell) in row.iter().enumerate() {
            if column_index >= columns.len() {
                columns.resize_with(column_index + 1, || UnknownColumn {
                    name: String::new(),
                    values: Vec::new(),
                });
            }
            let values = &mut columns[column_index].values;
            if values.len() < row_index {
                values.resize(row_index, String::new());
            }
            values.push(cell.clone());
        }
    }

    Ok(columns)
}

/// Length of the longest column that holds values.
pub fn longest_column_len(columns: &[Column]) -> Option<usize> {
    columns.iter().filter_map(Column::len).max()
}

/// Preview rows padded against the longest column; missing cells are `None`.
///
/// With no column holding values a single blank row is returned so the
/// headers still render.
pub fn to_rows(columns: &[Column]) -> Vec<Vec<Option<ColumnValue>>> {
    let Some(longest) = longest_column_len(columns) else {
        return vec![vec![None; columns.len()]];
    };

    (0..longest)
        .map(|index| columns.iter().map(|column| column.cell(index)).collect())
        .collect()
}

/// Export records: header row of columns with values, then stringified cells.
///
/// Columns without values are skipped entirely; shorter columns are padded
/// with empty strings.
pub fn to_csv_records(columns: &[Column]) -> Vec<Vec<String>> {
    let Some(longest) = longest_column_len(columns) else {
        return Vec::new();
    };
    let with_values: Vec<&Column> = columns.iter().filter(|column| column.has_values()).collect();

    let mut records = Vec::with_capacity(longest + 1);
    records.push(
        with_values
            .iter()
            .map(|column| column.name().to_string())
            .collect(),
    );
    for index in 0..longest {
        records.push(
            with_values
                .iter()
                .map(|column| {
                    column
                        .cell(index)
                        .map(|value| value.to_string())
                        .unwrap_or_default()
                })
                .collect(),
        );
    }
    records
}
