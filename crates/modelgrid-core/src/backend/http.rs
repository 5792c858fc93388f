use reqwest::Url;
use reqwest::multipart::Form;
use tracing::{debug, warn};

use super::ModelBackend;
use super::types::{
    EvaluateRequest, EvaluateResponse, InputValue, ListResponse, ModelDescriptor, NewModel,
    SheetSnapshot, StatusResponse,
};
use crate::error::{ModelGridError, Result};

/// [`ModelBackend`] over HTTP/JSON with `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    sheet_id: String,
}

fn backend_failure(message: Option<String>, fallback: &str) -> ModelGridError {
    ModelGridError::Backend(message.unwrap_or_else(|| fallback.to_string()))
}

impl HttpBackend {
    pub fn new(base_url: &str, sheet_id: impl Into<String>) -> Result<Self> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).map_err(|e| ModelGridError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            sheet_id: sheet_id.into(),
        })
    }

    pub fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ModelGridError::InvalidUrl(format!("{path}: {e}")))
    }
}

impl ModelBackend for HttpBackend {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        let url = self.endpoint(&format!("ml/list/{}", self.sheet_id))?;
        debug!(%url, "listing models");
        let body: ListResponse = self.client.get(url).send().await?.json().await?;
        if !body.success {
            warn!(message = ?body.message, "model listing rejected");
            return Err(backend_failure(body.message, "Error loading models."));
        }
        debug!(count = body.models.len(), "models listed");
        Ok(body.models)
    }

    async fn evaluate(&self, model_id: i64, inputs: &[InputValue]) -> Result<f64> {
        let url = self.endpoint(&format!("ml/evaluate/{}", model_id))?;
        debug!(%url, inputs = inputs.len(), "evaluating model");
        let body: EvaluateResponse = self
            .client
            .post(url)
            .json(&EvaluateRequest { inputs })
            .send()
            .await?
            .json()
            .await?;
        match (body.success, body.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(ModelGridError::Backend(
                "Evaluation response had no result".to_string(),
            )),
            (false, _) => Err(backend_failure(body.message, "Error evaluating formula")),
        }
    }

    async fn save(&self, snapshot: &SheetSnapshot) -> Result<()> {
        let url = self.endpoint(&format!("spreadsheet/save/{}", self.sheet_id))?;
        debug!(%url, cells = snapshot.data.len(), "saving sheet");
        let body: StatusResponse = self.client.post(url).json(snapshot).send().await?.json().await?;
        if body.success {
            Ok(())
        } else {
            Err(backend_failure(body.message, "Save rejected"))
        }
    }

    async fn create_model(&self, model: &NewModel) -> Result<String> {
        let url = self.endpoint("ml/create")?;
        let mut form = Form::new()
            .text("spreadsheet_id", self.sheet_id.clone())
            .text("model_name", model.name.clone())
            .text("model_type", model.model_type.as_str())
            .text("output_column", model.output_column.clone());
        for column in &model.input_columns {
            form = form.text("input_columns", column.clone());
        }
        debug!(%url, name = %model.name, "creating model");
        let body: StatusResponse = self.client.post(url).multipart(form).send().await?.json().await?;
        if body.success {
            Ok(body
                .message
                .unwrap_or_else(|| format!("Model {} created successfully", model.name)))
        } else {
            Err(backend_failure(body.message, "Model creation rejected"))
        }
    }
}
