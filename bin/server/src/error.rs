//! Error types for the server.
//!
//! - `ServerError`: startup failures; the process exits
//! - `WebhookError`: request failures, rendered as JSON responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Fatal errors raised while starting or running the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// Configuration could not be read or parsed.
    Config { reason: String },
    /// A required credential is missing or blank.
    MissingCredential { name: &'static str },
    /// An outbound client could not be constructed.
    Client { name: &'static str, reason: String },
    /// The listen address could not be bound.
    Bind { addr: String, reason: String },
    /// The HTTP server stopped with an error.
    Serve { reason: String },
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { reason } => write!(f, "failed to load configuration: {}", reason),
            Self::MissingCredential { name } => {
                write!(f, "required environment variable {} is missing", name)
            }
            Self::Client { name, reason } => {
                write!(f, "failed to build {} client: {}", name, reason)
            }
            Self::Bind { addr, reason } => write!(f, "failed to bind {}: {}", addr, reason),
            Self::Serve { reason } => write!(f, "server error: {}", reason),
        }
    }
}

impl std::error::Error for ServerError {}

/// Errors returned by request handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    /// The path credential does not match the bot token.
    InvalidToken,
    /// The body is not a JSON update.
    InvalidBody { reason: String },
    /// The platform refused or never received the webhook registration.
    RegistrationFailed { reason: String },
}

impl fmt::Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid webhook token"),
            Self::InvalidBody { reason } => write!(f, "invalid update payload: {}", reason),
            Self::RegistrationFailed { reason } => {
                write!(f, "webhook registration failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for WebhookError {}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidToken => (
                StatusCode::FORBIDDEN,
                Json(json!({ "detail": "Invalid token" })),
            )
                .into_response(),
            Self::InvalidBody { reason } => {
                tracing::warn!("Rejected webhook body: {}", reason);
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "detail": "Invalid update payload" })),
                )
                    .into_response()
            }
            Self::RegistrationFailed { reason } => {
                tracing::error!("Webhook registration failed: {}", reason);
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "Failed to set webhook" })),
                )
                    .into_response()
            }
        }
    }
}
