//! Message types for conversations.

use serde::{Deserialize, Serialize};

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User/human message.
    User,
    /// Assistant/AI message.
    Assistant,
}

impl MessageRole {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation.
///
/// Fields are private so a message cannot change once it has been appended
/// to a transcript. The serialized form is exactly what chat-completion
/// endpoints accept: `{"role": "...", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: String,
}

impl Message {
    /// Creates a new message.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    #[must_use]
    pub fn role(&self) -> MessageRole {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_creation() {
        let msg = Message::user("Hello!");
        assert_eq!(msg.role(), MessageRole::User);
        assert_eq!(msg.content(), "Hello!");
    }

    #[test]
    fn serializes_in_completion_wire_shape() {
        let json = serde_json::to_value(Message::assistant("hi")).expect("serialize");
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn role_display_matches_wire_name() {
        assert_eq!(MessageRole::System.to_string(), "system");
        assert_eq!(
            serde_json::to_string(&MessageRole::User).expect("serialize"),
            "\"user\""
        );
    }
}
