//! The tool boundary: catalog entries, typed content fragments, and the
//! client trait the rest of the system calls through.

pub mod builtin;
mod invoker;

pub use invoker::ToolInvoker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A catalog entry describing one callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolInfo {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// A typed content fragment returned by a tool backend. Only text fragments
/// are meaningful to this system; anything else is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
    Data { mime_type: String, data: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Tool '{tool}' is not available to agent '{agent}'")]
    PermissionDenied { agent: String, tool: String },

    #[error("Tool '{tool}' failed: {message}")]
    ExecutionFailed { tool: String, message: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool not found: {0}")]
    NotFound(String),
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Execution channel for named tools.
#[async_trait]
pub trait ToolClient: Send + Sync {
    async fn list_tools(&self) -> ToolResult<Vec<ToolInfo>>;

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult<Vec<Content>>;
}
