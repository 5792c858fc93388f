use modelgrid_engine::engine::{CellRef, Evaluation, FormulaCall, Nav};

use crate::backend::{ModelDescriptor, NewModel, SheetSnapshot};
use crate::error::EvalError;

/// Everything that can happen to a sheet: user input and completed requests.
#[derive(Debug)]
pub enum Action {
    /// Replace a cell's raw value (typing, editor bar, or programmatic).
    EditCell { at: CellRef, raw: String },
    Focus(CellRef),
    Navigate(Nav),

    /// Mouse down on a cell.
    SelectionStart(CellRef),
    /// Mouse over a cell; only matters while dragging.
    SelectionExtend(CellRef),
    /// Mouse up.
    SelectionEnd,

    Copy,
    /// Paste clipboard text at the focused cell.
    Paste(String),

    /// Set a column's display name. An empty name restores the letter.
    RenameColumn { col: usize, name: String },

    Save,
    SaveFinished {
        result: Result<(), String>,
        follow_up: Option<NewModel>,
    },

    CreateModel(NewModel),
    ModelCreated(Result<String, String>),

    LoadModels,
    ModelsLoaded(Result<Vec<ModelDescriptor>, String>),
    /// Forget the cached model directory and reload the list.
    ReloadModels,

    EvaluationFinished {
        at: CellRef,
        formula: String,
        outcome: Result<Evaluation, EvalError>,
    },
}

/// Side effects requested by [`Sheet::apply`](super::Sheet::apply).
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Resolve and submit a formula; completes with `Action::EvaluationFinished`.
    Evaluate {
        at: CellRef,
        formula: String,
        call: FormulaCall,
    },
    /// Persist the sheet, optionally followed by a model creation request.
    Save {
        snapshot: SheetSnapshot,
        follow_up: Option<NewModel>,
    },
    CreateModel(NewModel),
    LoadModels,
    InvalidateModels,
    WriteClipboard(String),
    Notify(Notice),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient on-screen message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}
