//! Backend transport.
//!
//! [`ModelBackend`] is the seam between the sheet and the server: listing
//! models, evaluating one, saving the sheet and creating a model. The
//! production implementation is [`HttpBackend`]; tests substitute their own.

mod http;
pub mod types;

pub use http::HttpBackend;
pub use types::{
    InputValue, ModelDescriptor, ModelType, NewModel, SheetSnapshot, SourceSpreadsheet,
};

use crate::error::Result;

/// Operations the sheet needs from the server. Every method reports a
/// server-side `success: false` as [`ModelGridError::Backend`](crate::ModelGridError::Backend).
pub trait ModelBackend: Send + Sync + 'static {
    /// All model descriptors visible from the current sheet.
    fn list_models(&self) -> impl Future<Output = Result<Vec<ModelDescriptor>>> + Send;

    /// Run model `model_id` on `inputs` and return the raw numeric result.
    fn evaluate(
        &self,
        model_id: i64,
        inputs: &[InputValue],
    ) -> impl Future<Output = Result<f64>> + Send;

    /// Persist the sheet's cells and column names.
    fn save(&self, snapshot: &SheetSnapshot) -> impl Future<Output = Result<()>> + Send;

    /// Train a new model on the current sheet. Returns the server's message.
    fn create_model(&self, model: &NewModel) -> impl Future<Output = Result<String>> + Send;
}
