//! Error types for modelgrid core.

use modelgrid_engine::engine::{CellError, ErrorKind};
use thiserror::Error;

/// Errors from the backend transport, persistence and model management.
#[derive(Error, Debug)]
pub enum ModelGridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// The request succeeded but the server reported a failure.
    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    InvalidModelRequest(String),
}

pub type Result<T> = std::result::Result<T, ModelGridError>;

/// Why a formula cell failed to evaluate. The display text is the message
/// shown next to the cell.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Invalid formula format. Use =ModelName(A1, B1, ...)")]
    Parse,

    #[error("Invalid cell reference: {token}")]
    Reference { token: String },

    #[error("Model requires {expected} inputs, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("Cell {token} must contain a numeric value for input {column}")]
    Type { token: String, column: String },

    #[error("Model \"{name}\" not found")]
    ModelNotFound { name: String },

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Backend(String),
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Parse => ErrorKind::Parse,
            EvalError::Reference { .. } => ErrorKind::Reference,
            EvalError::Arity { .. } => ErrorKind::Arity,
            EvalError::Type { .. } => ErrorKind::Type,
            EvalError::ModelNotFound { .. } => ErrorKind::ModelNotFound,
            EvalError::Network(_) => ErrorKind::Network,
            EvalError::Backend(_) => ErrorKind::Backend,
        }
    }

    /// Map a failed evaluation request. Server-reported failures keep the
    /// server's message; anything else is a transport failure.
    pub fn from_request(err: ModelGridError) -> EvalError {
        match err {
            ModelGridError::Backend(message) => EvalError::Backend(message),
            other => EvalError::Network(format!("Error evaluating formula: {}", other)),
        }
    }

    pub fn to_cell_error(&self) -> CellError {
        CellError {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}
