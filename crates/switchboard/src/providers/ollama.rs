//! Language-model gateway backed by the Ollama REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::base::{ModelInfo, Provider};
use super::errors::ProviderError;

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3.2";

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            model: model.into(),
        })
    }

    /// Provider against a local Ollama with the default model.
    pub fn localhost() -> Result<Self, ProviderError> {
        Self::new(OLLAMA_HOST, OLLAMA_DEFAULT_MODEL)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(ProviderError::ServerError(format!("{status}: {body}")))
        } else {
            Err(ProviderError::RequestFailed(format!("{status}: {body}")))
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn chat(&self, prompt: &str, model: Option<&str>) -> Result<String, ProviderError> {
        let model = model.unwrap_or(&self.model);
        debug!(model, prompt_len = prompt.len(), "sending generate request");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ResponseParseError(e.to_string()))?;
        Ok(body.response)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ResponseParseError(e.to_string()))?;
        Ok(body.models)
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
