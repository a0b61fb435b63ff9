use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::context::ContextSnapshot;
use crate::errors::AgentError;
use crate::message::Message;

/// Discovery view of a registered agent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
    pub tools: Vec<String>,
}

/// Outcome of one processed request.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub response: String,
    pub tools_used: Vec<String>,
    pub context: ContextSnapshot,
}

/// A domain-specialized request processor.
///
/// Contract: implementations append the incoming user turn before doing any
/// work, and the outgoing assistant turn (with the tools it used) before
/// returning. Failures an agent owns (a tool call going wrong) become an
/// apologetic natural-language reply, not an error; `Err` is reserved for
/// the language-model backend being unavailable, which the manager treats
/// as a miss-route and handles with general processing.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn allowed_tools(&self) -> &[String];

    async fn process_request(
        &self,
        message: &str,
        conversation_id: &str,
    ) -> Result<AgentReply, AgentError>;

    /// Defensive copy of this agent's history for the conversation.
    fn history(&self, conversation_id: &str) -> Vec<Message>;

    fn clear_context(&self, conversation_id: &str);

    fn info(&self) -> AgentInfo {
        AgentInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            tools: self.allowed_tools().to_vec(),
        }
    }
}
