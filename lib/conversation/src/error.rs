//! Error types for the conversation crate.

use std::fmt;
use voxbridge_core::ChatId;

/// Errors from conversation store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A thread panicked while holding the store's index lock.
    Poisoned,
    /// The backing storage could not serve the request.
    Unavailable { chat_id: ChatId, reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poisoned => write!(f, "conversation store lock poisoned"),
            Self::Unavailable { chat_id, reason } => {
                write!(f, "conversation store unavailable for chat {chat_id}: {reason}")
            }
        }
    }
}

impl std::error::Error for StoreError {}
