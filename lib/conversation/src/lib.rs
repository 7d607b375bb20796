//! Conversation memory for voxbridge.
//!
//! This crate provides:
//!
//! - **Message**: a role-tagged, immutable unit of chat history
//! - **Transcript**: the ordered history of one chat, seeded with a system prompt
//! - **Conversation Store**: chat id → transcript mapping with per-chat sessions

pub mod error;
pub mod message;
pub mod store;
pub mod transcript;

pub use error::StoreError;
pub use message::{Message, MessageRole};
pub use store::{ChatSession, ConversationStore, InMemoryConversationStore};
pub use transcript::{SYSTEM_PROMPT, Transcript};
