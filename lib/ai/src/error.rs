//! Error types for the completion client.

use std::fmt;

/// Reply used when the endpoint answers with a non-success status.
pub const STATUS_FALLBACK_REPLY: &str = "⚠️ Sorry, I’m having trouble thinking right now!";

/// Reply used when the request could not be completed at all.
pub const TRANSPORT_FALLBACK_REPLY: &str = "⚠️ Something went wrong while generating a response.";

/// Errors from completion backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// The endpoint answered with a non-success status.
    Status { status: u16, body: String },
    /// The request could not be sent or the connection failed.
    RequestFailed { reason: String },
    /// The response body did not contain reply text.
    ResponseParseFailed { reason: String },
    /// Timeout waiting for response.
    Timeout,
    /// The HTTP client could not be built.
    InvalidConfig { reason: String },
}

impl LlmError {
    /// The apology sent to the user in place of a model reply.
    #[must_use]
    pub fn fallback_reply(&self) -> &'static str {
        match self {
            Self::Status { .. } => STATUS_FALLBACK_REPLY,
            _ => TRANSPORT_FALLBACK_REPLY,
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } => {
                write!(f, "completion endpoint returned {status}: {body}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "completion request failed: {reason}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse completion response: {reason}")
            }
            Self::Timeout => write!(f, "completion request timed out"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid completion client configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::ResponseParseFailed {
                reason: e.to_string(),
            }
        } else {
            Self::RequestFailed {
                reason: e.to_string(),
            }
        }
    }
}
