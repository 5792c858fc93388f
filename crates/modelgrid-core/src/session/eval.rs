//! Formula evaluation against the model directory and the backend.

use modelgrid_engine::engine::{
    CellRef, ColumnType, Evaluation, FormulaCall, Grid, GridSize, class_label, format_result,
    raw_value,
};
use tracing::{debug, info};

use super::Session;
use crate::backend::{InputValue, ModelBackend, ModelDescriptor, ModelType};
use crate::error::EvalError;

impl<B: ModelBackend> Session<B> {
    /// Evaluate a parsed formula call.
    ///
    /// Loads the model directory on first use (shared with any concurrent
    /// caller), resolves the model by name, collects and coerces the
    /// referenced cells, then submits them. Nothing is sent when resolution
    /// fails.
    pub async fn evaluate(&self, call: &FormulaCall) -> Result<Evaluation, EvalError> {
        self.directory
            .ensure_loaded(|| self.backend.list_models())
            .await
            .map_err(|e| EvalError::Network(format!("Error loading models: {e}")))?;

        let model = self
            .directory
            .lookup(&call.model_name)
            .ok_or_else(|| EvalError::ModelNotFound {
                name: call.model_name.clone(),
            })?;

        let inputs = resolve_inputs(&model, &call.args, &self.grid, self.size)?;
        debug!(model = %model.name, id = model.id, ?inputs, "submitting evaluation");

        let value = self
            .backend
            .evaluate(model.id, &inputs)
            .await
            .map_err(EvalError::from_request)?;
        info!(model = %model.name, value, "model evaluated");

        Ok(evaluation_for(model.model_type, value))
    }
}

/// Check arity, resolve every reference and coerce each value to what the
/// model's input column expects.
///
/// Empty cells are sent as `0`. A `number` input requires a strictly numeric
/// value; any other declared type passes the raw text through.
pub fn resolve_inputs(
    model: &ModelDescriptor,
    args: &[String],
    grid: &Grid,
    size: GridSize,
) -> Result<Vec<InputValue>, EvalError> {
    if args.len() != model.input_columns.len() {
        return Err(EvalError::Arity {
            expected: model.input_columns.len(),
            got: args.len(),
        });
    }

    let mut inputs = Vec::with_capacity(args.len());
    for (i, token) in args.iter().enumerate() {
        let cell = CellRef::parse(token, size).ok_or_else(|| EvalError::Reference {
            token: token.clone(),
        })?;
        let raw = raw_value(grid, &cell);
        if raw.is_empty() {
            inputs.push(InputValue::Number(0.0));
            continue;
        }

        let value = match model.input_type(i) {
            Some(ColumnType::Number) => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => InputValue::Number(n),
                _ => {
                    return Err(EvalError::Type {
                        token: token.clone(),
                        column: model.input_columns[i].clone(),
                    });
                }
            },
            _ => InputValue::Text(raw),
        };
        inputs.push(value);
    }
    Ok(inputs)
}

/// Turn a raw model output into what the cell shows.
pub fn evaluation_for(model_type: ModelType, value: f64) -> Evaluation {
    let result = format_result(value);
    let display = match model_type {
        ModelType::Regression => result.clone(),
        ModelType::Classification => {
            let rounded = result.parse::<f64>().unwrap_or(value);
            class_label(rounded).to_string()
        }
    };
    Evaluation { display, result }
}
