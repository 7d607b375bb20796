//! Error types for outbound delivery.

use std::fmt;

/// Errors from messaging-platform calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The request could not be sent or the connection failed.
    RequestFailed { method: &'static str, reason: String },
    /// The platform answered with a non-success status.
    Status {
        method: &'static str,
        status: u16,
        body: String,
    },
    /// The HTTP client could not be built.
    InvalidConfig { reason: String },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { method, reason } => {
                write!(f, "{method} request failed: {reason}")
            }
            Self::Status {
                method,
                status,
                body,
            } => write!(f, "{method} returned {status}: {body}"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid messaging client configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for DeliveryError {}
