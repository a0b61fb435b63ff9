//! Scripted provider for tests: replays canned replies in order and records
//! every prompt it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::base::{ModelInfo, Provider};
use super::errors::ProviderError;

enum ScriptedReply {
    Text(String),
    Failure(String),
}

#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::default();
        for reply in replies {
            provider
                .replies
                .lock()
                .unwrap()
                .push_back(ScriptedReply::Text(reply.into()));
        }
        provider
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Text(text.into()));
        self
    }

    /// Queue a backend failure.
    pub fn failure(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Failure(message.into()));
        self
    }

    /// Every prompt seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn chat(&self, prompt: &str, _model: Option<&str>) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure(message)) => Err(ProviderError::ServerError(message)),
            None => Err(ProviderError::RequestFailed(
                "scripted provider exhausted".to_string(),
            )),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        Ok(vec![ModelInfo {
            name: "scripted".to_string(),
            size: None,
            modified_at: None,
        }])
    }

    fn default_model(&self) -> &str {
        "scripted"
    }
}
