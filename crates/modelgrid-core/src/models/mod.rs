//! Model directory cache.

mod directory;

pub use directory::{ModelDirectory, ModelIndex, index_models};
