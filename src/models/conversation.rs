use serde::{Deserialize, Serialize};

use super::enums::Role;

/// One turn of a conversation.
///
/// Messages are immutable once appended, except the trailing assistant
/// message, which grows while a stream is being consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// The trailing assistant message, if the conversation ends with one.
pub fn last_assistant(messages: &[ChatMessage]) -> Option<&ChatMessage> {
    messages.last().filter(|m| m.role == Role::Assistant)
}
