//! Saving the sheet, creating models and reading initial sheet files.

use std::path::Path;

use tracing::{info, warn};

use super::Session;
use crate::backend::{ModelBackend, NewModel, SheetSnapshot};
use crate::error::{ModelGridError, Result};

impl<B: ModelBackend> Session<B> {
    pub async fn save(&self, snapshot: &SheetSnapshot) -> Result<()> {
        match self.backend.save(snapshot).await {
            Ok(()) => {
                info!(cells = snapshot.data.len(), "sheet saved");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "sheet save failed");
                Err(e)
            }
        }
    }

    pub async fn create_model(&self, model: &NewModel) -> Result<String> {
        if model.input_columns.is_empty() {
            return Err(ModelGridError::InvalidModelRequest(
                "Please select at least one input column".to_string(),
            ));
        }
        let message = self.backend.create_model(model).await?;
        info!(name = %model.name, kind = %model.model_type, "model created");
        Ok(message)
    }
}

/// Read a sheet file in the save payload shape (`{data, column_names}`).
pub fn read_snapshot(path: &Path) -> Result<SheetSnapshot> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
