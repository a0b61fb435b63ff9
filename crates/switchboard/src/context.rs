//! Per-agent conversation state: a bounded message history plus free-form
//! metadata, keyed by conversation id.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::message::{Message, Role};

/// Sliding window size for a single conversation's history.
pub const MAX_CONTEXT_MESSAGES: usize = 20;

/// Conversation id used when the caller does not supply one.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Bounded history and metadata for one conversation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub conversation_id: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl ConversationContext {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            messages: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Append a message, evicting the oldest entries beyond the window.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        if self.messages.len() > MAX_CONTEXT_MESSAGES {
            let excess = self.messages.len() - MAX_CONTEXT_MESSAGES;
            self.messages.drain(..excess);
        }
    }
}

/// Read-only view of a conversation handed back to callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub conversation_id: String,
    pub messages: Vec<Message>,
}

impl ContextSnapshot {
    pub fn empty(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            messages: Vec::new(),
        }
    }
}

/// Conversation contexts owned by a single agent.
///
/// The mutex guards individual map operations only and is never held across
/// an await point. Two concurrent requests on the same conversation id may
/// interleave their appends; callers needing strict per-conversation
/// ordering must serialize requests themselves.
#[derive(Default)]
pub struct ContextStore {
    contexts: Mutex<HashMap<String, ConversationContext>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the context for `conversation_id`, creating an
    /// empty one if it does not exist. Idempotent.
    pub fn get_or_create(&self, conversation_id: &str) -> ConversationContext {
        let mut contexts = self.contexts.lock().unwrap_or_else(|e| e.into_inner());
        contexts
            .entry(conversation_id.to_string())
            .or_insert_with(|| ConversationContext::new(conversation_id))
            .clone()
    }

    /// Append a turn to the conversation, trimming to the window size.
    pub fn add_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
        tools_used: Vec<String>,
    ) {
        let message = match role {
            Role::User => Message::user(content),
            Role::Assistant => Message::assistant(content, tools_used),
        };
        let mut contexts = self.contexts.lock().unwrap_or_else(|e| e.into_inner());
        contexts
            .entry(conversation_id.to_string())
            .or_insert_with(|| ConversationContext::new(conversation_id))
            .push(message);
    }

    /// Attach a metadata value to the conversation.
    pub fn set_metadata(&self, conversation_id: &str, key: &str, value: Value) {
        let mut contexts = self.contexts.lock().unwrap_or_else(|e| e.into_inner());
        contexts
            .entry(conversation_id.to_string())
            .or_insert_with(|| ConversationContext::new(conversation_id))
            .metadata
            .insert(key.to_string(), value);
    }

    /// Defensive copy of the history; empty for unknown ids, never an error.
    pub fn history(&self, conversation_id: &str) -> Vec<Message> {
        let contexts = self.contexts.lock().unwrap_or_else(|e| e.into_inner());
        contexts
            .get(conversation_id)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Drop the conversation entirely; the next access starts fresh.
    pub fn clear(&self, conversation_id: &str) {
        let mut contexts = self.contexts.lock().unwrap_or_else(|e| e.into_inner());
        contexts.remove(conversation_id);
    }

    /// Snapshot used in routing results.
    pub fn snapshot(&self, conversation_id: &str) -> ContextSnapshot {
        ContextSnapshot {
            conversation_id: conversation_id.to_string(),
            messages: self.history(conversation_id),
        }
    }
}
