//! voxbridge webhook server.
//!
//! Receives Telegram updates over a webhook, queues them for the reply
//! pipeline, and exposes an operator endpoint for webhook registration.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;

pub use app::{AppState, build_orchestrator, build_telegram, create_router};
pub use config::ServerConfig;
pub use error::{ServerError, WebhookError};
