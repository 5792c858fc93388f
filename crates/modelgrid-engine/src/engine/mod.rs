//! Sheet engine API.
//!
//! This module provides the pieces of the sheet that involve no I/O:
//!
//! - [`Cell`], [`CellState`], [`Grid`] - Sparse cell storage and per-cell evaluation state
//! - [`CellRef`], [`GridSize`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`parse_formula`] - The `=Model(A1, B1)` grammar
//! - [`infer_column_type`] - Column type badges
//! - [`Selection`] - Rectangular mouse selection
//! - [`copy_text`], [`paste_targets`] - Clipboard interchange (TSV)
//! - [`Nav`] - Keyboard navigation
//! - [`format_result`] - Formatting of model results for display

mod cell;
mod cell_ref;
mod clipboard;
mod column_type;
mod format;
mod formula;
mod navigate;
mod selection;

pub use cell::{Cell, CellError, CellState, ErrorKind, Evaluation, Grid, new_grid, raw_value};
pub use cell_ref::{CellRef, GridSize, MAX_COLS};
pub use clipboard::{copy_text, parse_clipboard_grid, paste_targets};
pub use column_type::{ColumnType, column_type, infer_column_type, is_numeric};
pub use format::{class_label, format_result};
pub use formula::{FormulaCall, FormulaParse, is_formula, parse_formula};
pub use navigate::Nav;
pub use selection::{Bounds, Selection};
