//! Request and response shapes for the backend endpoints.

use modelgrid_engine::engine::{CellRef, ColumnType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Regression,
    Classification,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Regression => "regression",
            ModelType::Classification => "classification",
        }
    }

    pub fn parse(s: &str) -> Option<ModelType> {
        match s.to_ascii_lowercase().as_str() {
            "regression" => Some(ModelType::Regression),
            "classification" => Some(ModelType::Classification),
            _ => None,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceSpreadsheet {
    pub id: i64,
    pub name: String,
}

/// Metadata for a trained model, as listed by `GET /ml/list/{sheet}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    pub input_columns: Vec<String>,
    pub output_column: String,
    #[serde(default)]
    pub source_column_types: HashMap<String, ColumnType>,
    #[serde(default)]
    pub source_column_names: HashMap<String, String>,
    #[serde(default)]
    pub source_spreadsheet: Option<SourceSpreadsheet>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub metrics: BTreeMap<String, serde_json::Value>,
}

impl ModelDescriptor {
    /// Declared type of the `index`-th input, if the backend recorded one.
    pub fn input_type(&self, index: usize) -> Option<ColumnType> {
        let column = self.input_columns.get(index)?;
        self.source_column_types.get(column).copied()
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key)?.as_f64()
    }

    /// Display name of a column as it was named on the training sheet.
    pub fn column_label<'a>(&'a self, column: &'a str) -> &'a str {
        self.source_column_names
            .get(column)
            .map(String::as_str)
            .unwrap_or(column)
    }

    /// Example invocation using row 1 of each input column.
    pub fn usage_example(&self) -> String {
        let args: Vec<String> = self
            .input_columns
            .iter()
            .map(|col| format!("{}1", col))
            .collect();
        format!("={}({})", self.name, args.join(", "))
    }
}

/// A single value in an evaluation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Serialize)]
pub struct EvaluateRequest<'a> {
    pub inputs: &'a [InputValue],
}

#[derive(Debug, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Persisted form of a sheet: the sparse cell map keyed `"{row}-{col}"` plus
/// column-name overrides. Also used as the format of `--initial` files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetSnapshot {
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(default)]
    pub column_names: BTreeMap<String, String>,
}

impl SheetSnapshot {
    pub fn insert(&mut self, cell: CellRef, raw: impl Into<String>) {
        self.data.insert(cell.wire_key(), raw.into());
    }
}

/// Fields of a model creation request (`POST /ml/create`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewModel {
    pub name: String,
    pub model_type: ModelType,
    pub input_columns: Vec<String>,
    pub output_column: String,
}
