//! modelgrid-core - UI-agnostic sheet state, model directory and backend client.

pub mod backend;
pub mod document;
pub mod error;
pub mod models;
pub mod session;

pub use backend::{HttpBackend, ModelBackend};
pub use document::{Action, Effect, Notice, NoticeKind, Sheet};
pub use error::{EvalError, ModelGridError, Result};
pub use models::ModelDirectory;
pub use session::{Dispatcher, Session};

pub use modelgrid_engine::engine::{CellRef, GridSize};
