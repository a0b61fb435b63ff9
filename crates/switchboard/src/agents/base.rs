use serde_json::Value;

use crate::context::ContextStore;
use crate::message::{Message, Role};
use crate::tools::{ToolError, ToolInvoker};

/// Allow-list entry meaning "all tools permitted".
pub const WILDCARD_TOOL: &str = "*";

/// How many history entries the enhanced prompt includes.
const PROMPT_HISTORY_WINDOW: usize = 10;

/// The capability set every concrete agent embeds: identity, tool
/// allow-list, owned conversation contexts, and prompt assembly.
pub struct AgentCore {
    name: String,
    description: String,
    system_prompt: String,
    allowed_tools: Vec<String>,
    contexts: ContextStore,
    invoker: ToolInvoker,
}

impl AgentCore {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
        allowed_tools: Vec<String>,
        invoker: ToolInvoker,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            allowed_tools,
            contexts: ContextStore::new(),
            invoker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn allowed_tools(&self) -> &[String] {
        &self.allowed_tools
    }

    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    pub fn is_tool_available(&self, tool: &str) -> bool {
        self.allowed_tools
            .iter()
            .any(|allowed| allowed == tool || allowed == WILDCARD_TOOL)
    }

    /// Permission-checked tool execution. The allow-list is enforced here,
    /// before anything reaches the invoker.
    pub async fn execute_tool(&self, tool: &str, arguments: Value) -> Result<String, ToolError> {
        if !self.is_tool_available(tool) {
            return Err(ToolError::PermissionDenied {
                agent: self.name.clone(),
                tool: tool.to_string(),
            });
        }
        self.invoker.call_tool(tool, arguments).await
    }

    /// Deterministic prompt assembly: system prompt, recent history, the
    /// current request, the allowed tools, and the agent's identity.
    pub fn create_enhanced_prompt(
        &self,
        user_message: &str,
        history: &[Message],
        include_history: bool,
    ) -> String {
        let mut prompt = self.system_prompt.clone();
        prompt.push_str("\n\n");

        if include_history && !history.is_empty() {
            prompt.push_str("Conversation so far:\n");
            let start = history.len().saturating_sub(PROMPT_HISTORY_WINDOW);
            for message in &history[start..] {
                let role = match message.role {
                    Role::User => "USER",
                    Role::Assistant => "ASSISTANT",
                };
                match &message.tools_used {
                    Some(tools) if !tools.is_empty() => prompt.push_str(&format!(
                        "{}: {} (used tools: {})\n",
                        role,
                        message.content,
                        tools.join(", ")
                    )),
                    _ => prompt.push_str(&format!("{}: {}\n", role, message.content)),
                }
            }
            prompt.push('\n');
        }

        prompt.push_str(&format!("Current request: {user_message}\n\n"));
        prompt.push_str(&format!("Available tools: {}\n", self.allowed_tools.join(", ")));
        prompt.push_str(&format!("You are {}: {}\n", self.name, self.description));
        prompt
    }
}
