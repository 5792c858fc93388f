//! Cell data structures for the sheet grid.
//!
//! - [`CellState`] - Where a cell sits in the evaluation state machine
//! - [`Cell`] - Raw text plus its derived state
//! - [`Grid`] - Thread-safe sparse storage for cells (backed by `DashMap`)
//!
//! The raw text is always the source of truth. The display of a formula cell
//! is a cache of its last evaluation and may be overwritten at any time.

use dashmap::DashMap;
use std::sync::Arc;

use super::cell_ref::CellRef;
use super::formula::is_formula;

/// Classification of a cell-level failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Reference,
    Arity,
    Type,
    ModelNotFound,
    Network,
    Backend,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Reference => "reference",
            ErrorKind::Arity => "arity",
            ErrorKind::Type => "type",
            ErrorKind::ModelNotFound => "model",
            ErrorKind::Network => "network",
            ErrorKind::Backend => "backend",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Result of a successful model evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// What the grid shows (the rounded result, or a class label).
    pub display: String,
    /// The rounded numeric result, kept even when the display is a label.
    pub result: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CellState {
    /// Plain value, shown verbatim.
    Literal,
    /// Formula waiting on the model directory or the evaluation endpoint.
    Pending,
    Evaluated(Evaluation),
    Error(CellError),
}

/// A cell in the sheet grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub raw: String,
    pub state: CellState,
}

impl Cell {
    /// Create a cell from raw user input. Formulas start out pending.
    pub fn from_input(raw: &str) -> Cell {
        let state = if is_formula(raw) {
            CellState::Pending
        } else {
            CellState::Literal
        };
        Cell {
            raw: raw.to_string(),
            state,
        }
    }

    /// Text shown in the grid.
    pub fn display(&self) -> &str {
        match &self.state {
            CellState::Evaluated(eval) => &eval.display,
            _ => &self.raw,
        }
    }

    /// Explanation shown next to the formula bar.
    pub fn tooltip(&self) -> Option<String> {
        match &self.state {
            CellState::Evaluated(eval) => Some(format!("Formula result: {}", eval.result)),
            CellState::Error(err) => Some(err.message.clone()),
            CellState::Pending => Some("Evaluating...".to_string()),
            CellState::Literal => None,
        }
    }

    pub fn error(&self) -> Option<&CellError> {
        match &self.state {
            CellState::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Thread-safe sparse grid storage. Absence of an entry means the cell is empty.
pub type Grid = Arc<DashMap<CellRef, Cell>>;

pub fn new_grid() -> Grid {
    Arc::new(DashMap::new())
}

/// Raw value of a cell, or an empty string when absent.
pub fn raw_value(grid: &Grid, cell: &CellRef) -> String {
    grid.get(cell).map(|c| c.raw.clone()).unwrap_or_default()
}
