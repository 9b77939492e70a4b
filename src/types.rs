//! Common types used throughout the plant care bot.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Platform-assigned user identifier used to key sessions.
pub type UserKey = u64;

/// Role of a message in the conversation.
///
/// Maps to the chat service's message roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    /// Context seeded from the latest prediction
    System,
    /// Message from the human user
    User,
    /// Reply from the chat service
    Assistant,
}

/// One turn in a conversation, in the shape the chat service expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Millisecond epoch timestamp taken at creation, as text.
    pub id: String,
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Utc::now().timestamp_millis().to_string(),
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}
