//! Backend-facing half of the sheet: formula evaluation, persistence and the
//! effect runner.
//!
//! A [`Session`] shares the sheet's grid so evaluation tasks read the cell
//! values current when they run. It is cheap to clone; every clone shares the
//! same backend and model directory.

mod dispatch;
mod eval;
mod persist;

use std::sync::Arc;

use modelgrid_engine::engine::{Evaluation, FormulaParse, Grid, GridSize, parse_formula};

use crate::backend::ModelBackend;
use crate::document::{Action, Effect};
use crate::error::EvalError;
use crate::models::ModelDirectory;

pub use dispatch::Dispatcher;
pub use eval::{evaluation_for, resolve_inputs};
pub use persist::read_snapshot;

pub struct Session<B> {
    backend: Arc<B>,
    directory: Arc<ModelDirectory>,
    grid: Grid,
    size: GridSize,
}

impl<B> Clone for Session<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            directory: Arc::clone(&self.directory),
            grid: Arc::clone(&self.grid),
            size: self.size,
        }
    }
}

impl<B: ModelBackend> Session<B> {
    pub fn new(backend: B, grid: Grid, size: GridSize) -> Self {
        Self {
            backend: Arc::new(backend),
            directory: Arc::new(ModelDirectory::new()),
            grid,
            size,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn directory(&self) -> &ModelDirectory {
        &self.directory
    }

    /// Carry out one backend effect and return the action reporting its
    /// outcome. Effects that are not backend requests yield `None`.
    pub async fn run(&self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::Evaluate { at, formula, call } => {
                let outcome = self.evaluate(&call).await;
                Some(Action::EvaluationFinished {
                    at,
                    formula,
                    outcome,
                })
            }
            Effect::Save {
                snapshot,
                follow_up,
            } => {
                let result = self.save(&snapshot).await.map_err(|e| e.to_string());
                Some(Action::SaveFinished { result, follow_up })
            }
            Effect::CreateModel(model) => {
                let result = self.create_model(&model).await.map_err(|e| e.to_string());
                Some(Action::ModelCreated(result))
            }
            Effect::LoadModels => {
                let result = self.backend.list_models().await.map_err(|e| e.to_string());
                Some(Action::ModelsLoaded(result))
            }
            Effect::InvalidateModels => {
                self.directory.invalidate();
                None
            }
            Effect::WriteClipboard(_) | Effect::Notify(_) => None,
        }
    }

    /// Evaluate text as if it had been typed into a cell. A literal evaluates
    /// to itself.
    pub async fn evaluate_text(&self, text: &str) -> Result<Evaluation, EvalError> {
        match parse_formula(text) {
            FormulaParse::Call(call) => self.evaluate(&call).await,
            FormulaParse::Invalid => Err(EvalError::Parse),
            FormulaParse::NotFormula => Ok(Evaluation {
                display: text.to_string(),
                result: text.to_string(),
            }),
        }
    }
}
