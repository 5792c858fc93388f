//! Error types for the modelgrid binary

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading and validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Refusing to read {}: file too large ({size} bytes, max {max})", path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid grid size: {0}")]
    GridSize(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
