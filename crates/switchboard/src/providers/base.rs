use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::ProviderError;

/// A model advertised by the generative-text backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

/// Gateway to a generative-text backend.
///
/// Two operations only: free-form chat completion and model discovery.
/// Everything else in the system is built on top of these.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a prompt and return the model's plain-text reply.
    ///
    /// `model` overrides the provider's default model for this call.
    async fn chat(&self, prompt: &str, model: Option<&str>) -> Result<String, ProviderError>;

    /// List the models the backend currently serves.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError>;

    /// Model used when a call does not name one.
    fn default_model(&self) -> &str;
}
