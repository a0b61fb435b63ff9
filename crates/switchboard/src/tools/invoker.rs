use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{Content, ToolClient, ToolError, ToolInfo, ToolResult};

/// Bridges the rest of the system to the tool backend, flattening content
/// fragments into plain text and scoping failures to the tool that caused
/// them.
#[derive(Clone)]
pub struct ToolInvoker {
    client: Arc<dyn ToolClient>,
}

impl ToolInvoker {
    pub fn new(client: Arc<dyn ToolClient>) -> Self {
        Self { client }
    }

    pub async fn list_tools(&self) -> ToolResult<Vec<ToolInfo>> {
        self.client.list_tools().await
    }

    /// Execute a tool and return its text content, newline-joined. Non-text
    /// fragments are dropped. Any backend failure comes back as an
    /// execution error carrying the tool name.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult<String> {
        debug!(tool = name, "invoking tool");
        let contents = self
            .client
            .call_tool(name, arguments)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool: name.to_string(),
                message: e.to_string(),
            })?;

        let text = contents
            .iter()
            .filter_map(|fragment| match fragment {
                Content::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FragmentClient;

    #[async_trait]
    impl ToolClient for FragmentClient {
        async fn list_tools(&self) -> ToolResult<Vec<ToolInfo>> {
            Ok(vec![])
        }

        async fn call_tool(&self, name: &str, _arguments: Value) -> ToolResult<Vec<Content>> {
            match name {
                "mixed" => Ok(vec![
                    Content::text("first"),
                    Content::Data {
                        mime_type: "image/png".to_string(),
                        data: "aGk=".to_string(),
                    },
                    Content::text("second"),
                ]),
                other => Err(ToolError::NotFound(other.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn joins_text_fragments_and_ignores_the_rest() {
        let invoker = ToolInvoker::new(Arc::new(FragmentClient));
        let text = invoker
            .call_tool("mixed", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(text, "first\nsecond");
    }

    #[tokio::test]
    async fn failures_carry_the_tool_name() {
        let invoker = ToolInvoker::new(Arc::new(FragmentClient));
        let err = invoker
            .call_tool("missing", serde_json::json!({}))
            .await
            .unwrap_err();
        match err {
            ToolError::ExecutionFailed { tool, message } => {
                assert_eq!(tool, "missing");
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
