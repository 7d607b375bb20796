//! Error types for speech synthesis.

use std::fmt;

/// Errors from speech synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// The text contains nothing that can be spoken.
    EmptyText,
    /// The request could not be sent or the connection failed.
    RequestFailed { reason: String },
    /// The engine answered with a non-success status.
    Status { status: u16, chunk: usize },
    /// The HTTP client could not be built.
    InvalidConfig { reason: String },
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => write!(f, "no text to speak"),
            Self::RequestFailed { reason } => {
                write!(f, "speech request failed: {reason}")
            }
            Self::Status { status, chunk } => {
                write!(f, "speech engine returned {status} for chunk {chunk}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid speech configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for SynthesisError {}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        Self::RequestFailed {
            reason: e.without_url().to_string(),
        }
    }
}
