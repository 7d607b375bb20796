//! Error types for the relay crate.
//!
//! - `DispatchError`: an update was refused before processing started
//! - `RelayError`: processing failed outside reply generation
//!
//! Completion, delivery and synthesis failures are not listed here. The
//! orchestrator receives them as typed results from each client and decides
//! to degrade and continue.

use std::fmt;
use voxbridge_conversation::StoreError;
use voxbridge_core::ChatId;

/// Reasons an update is refused at the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The path credential does not match the bot token.
    InvalidToken,
    /// Every worker is busy and the queue is full; the update is dropped.
    QueueFull,
    /// The worker pool has shut down.
    Closed,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid webhook token"),
            Self::QueueFull => write!(f, "update queue is full"),
            Self::Closed => write!(f, "update dispatcher is shut down"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Failures that abort processing of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The conversation store could not provide the chat's transcript.
    Store { chat_id: ChatId, source: StoreError },
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store { chat_id, source } => {
                write!(f, "transcript unavailable for chat {chat_id}: {source}")
            }
        }
    }
}

impl std::error::Error for RelayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_error_display_includes_source() {
        let err = RelayError::Store {
            chat_id: ChatId::new(5),
            source: StoreError::Poisoned,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("chat 5"));
        assert!(rendered.contains("poisoned"));
    }

    #[test]
    fn dispatch_error_display() {
        assert_eq!(DispatchError::InvalidToken.to_string(), "invalid webhook token");
    }
}
