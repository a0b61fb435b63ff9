use std::sync::Arc;

use async_trait::async_trait;
use indoc::indoc;

use super::agent::{Agent, AgentReply};
use super::base::{AgentCore, WILDCARD_TOOL};
use crate::errors::AgentError;
use crate::message::{Message, Role};
use crate::pipeline::ToolPipeline;
use crate::tools::ToolInvoker;

const SYSTEM_PROMPT: &str = indoc! {"
    You are a helpful general-purpose assistant. Use the available tools
    when they improve your answer, and reply in plain language otherwise.
"};

/// Catch-all agent: wildcard tool access, delegates tool selection and
/// execution to the pipeline.
pub struct GeneralAgent {
    core: AgentCore,
    pipeline: Arc<ToolPipeline>,
}

impl GeneralAgent {
    pub fn new(pipeline: Arc<ToolPipeline>, invoker: ToolInvoker) -> Self {
        Self {
            core: AgentCore::new(
                "general",
                "Handles any request, selecting tools on demand",
                SYSTEM_PROMPT,
                vec![WILDCARD_TOOL.to_string()],
                invoker,
            ),
            pipeline,
        }
    }
}

#[async_trait]
impl Agent for GeneralAgent {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn description(&self) -> &str {
        self.core.description()
    }

    fn allowed_tools(&self) -> &[String] {
        self.core.allowed_tools()
    }

    async fn process_request(
        &self,
        message: &str,
        conversation_id: &str,
    ) -> Result<AgentReply, AgentError> {
        self.core
            .contexts()
            .add_message(conversation_id, Role::User, message, vec![]);

        let outcome = self.pipeline.process_with_tools(message, None).await?;

        self.core.contexts().add_message(
            conversation_id,
            Role::Assistant,
            &outcome.response,
            outcome.tools_used.clone(),
        );

        Ok(AgentReply {
            response: outcome.response,
            tools_used: outcome.tools_used,
            context: self.core.contexts().snapshot(conversation_id),
        })
    }

    fn history(&self, conversation_id: &str) -> Vec<Message> {
        self.core.contexts().history(conversation_id)
    }

    fn clear_context(&self, conversation_id: &str) {
        self.core.contexts().clear(conversation_id)
    }
}
