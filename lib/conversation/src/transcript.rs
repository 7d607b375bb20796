//! Ordered, append-only history of one chat.
//!
//! A transcript is the context window sent to the completion model. It always
//! starts with the system prompt and only ever grows. Nothing bounds its
//! length; a long-lived chat keeps every exchange for the life of the process.

use crate::message::{Message, MessageRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voxbridge_core::ChatId;

/// System prompt every new transcript is seeded with.
pub const SYSTEM_PROMPT: &str = "You are a helpful and friendly Telegram chatbot.";

/// The message history of a single chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    chat_id: ChatId,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl Transcript {
    /// Creates a transcript seeded with [`SYSTEM_PROMPT`].
    #[must_use]
    pub fn new(chat_id: ChatId) -> Self {
        Self::with_system_prompt(chat_id, SYSTEM_PROMPT)
    }

    /// Creates a transcript seeded with a custom system prompt.
    #[must_use]
    pub fn with_system_prompt(chat_id: ChatId, prompt: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            chat_id,
            messages: vec![Message::system(prompt)],
            created_at: now,
            last_active_at: now,
        }
    }

    /// Appends a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Appends an assistant message.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    /// Appends a user message and its reply together.
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.push_user(user);
        self.push_assistant(assistant);
    }

    fn push(&mut self, message: Message) {
        debug_assert_ne!(message.role(), MessageRole::System);
        self.messages.push(message);
        self.last_active_at = Utc::now();
    }

    #[must_use]
    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// All messages, system prompt first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages, including the system prompt.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// A transcript is never empty; it always holds the system prompt.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the last message.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }
}
