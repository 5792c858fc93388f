//! Column type inference for header badges.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell::Grid;
use super::cell_ref::CellRef;

/// Inferred (or declared) kind of values in a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    String,
    Mixed,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::String => "string",
            ColumnType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value counts as numeric when it parses to a finite number.
pub fn is_numeric(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

/// Infer a column type from its values. Empty values are skipped; an
/// all-empty column has no type.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<ColumnType> {
    let mut has_number = false;
    let mut has_string = false;
    for value in values {
        if value.is_empty() {
            continue;
        }
        if is_numeric(value) {
            has_number = true;
        } else {
            has_string = true;
        }
    }
    match (has_number, has_string) {
        (false, false) => None,
        (true, false) => Some(ColumnType::Number),
        (false, true) => Some(ColumnType::String),
        (true, true) => Some(ColumnType::Mixed),
    }
}

/// Scan every row of `col` in the grid.
pub fn column_type(grid: &Grid, col: usize, rows: usize) -> Option<ColumnType> {
    let values: Vec<String> = (0..rows)
        .filter_map(|row| grid.get(&CellRef::new(col, row)).map(|c| c.raw.clone()))
        .collect();
    infer_column_type(values.iter().map(String::as_str))
}
