//! Conversation turns exchanged between the user and an agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Roles to describe the origin of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Tool names invoked while producing this turn. Only present on
    /// assistant turns that actually used tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_used: Option<Vec<String>>,
}

impl Message {
    /// Create a user turn with the current timestamp.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            tools_used: None,
        }
    }

    /// Create an assistant turn, recording the tools it used (if any).
    pub fn assistant(content: impl Into<String>, tools_used: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            tools_used: if tools_used.is_empty() {
                None
            } else {
                Some(tools_used)
            },
        }
    }
}
