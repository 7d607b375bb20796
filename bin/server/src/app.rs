//! Application state, router and service wiring.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::routes;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use voxbridge_ai::OpenAiCompatibleClient;
use voxbridge_conversation::InMemoryConversationStore;
use voxbridge_messaging::TelegramClient;
use voxbridge_relay::{DispatchHandle, Orchestrator};
use voxbridge_speech::GoogleTranslateTts;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatch: DispatchHandle,
    pub telegram: Arc<TelegramClient>,
    pub webhook_url: Arc<str>,
}

impl AppState {
    pub fn new(
        dispatch: DispatchHandle,
        telegram: Arc<TelegramClient>,
        webhook_url: impl Into<String>,
    ) -> Self {
        Self {
            dispatch,
            telegram,
            webhook_url: Arc::from(webhook_url.into()),
        }
    }
}

/// Builds the router with request tracing.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/", get(routes::root))
        .route("/webhook/{token}", post(routes::webhook))
        .route("/set_webhook", post(routes::set_webhook))
        .layer(trace_layer)
        .with_state(state)
}

/// Builds the Bot API client from configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build_telegram(config: &ServerConfig) -> Result<TelegramClient, ServerError> {
    TelegramClient::new(&config.telegram.api_base, &config.telegram_token).map_err(|e| {
        ServerError::Client {
            name: "telegram",
            reason: e.to_string(),
        }
    })
}

/// Builds the orchestrator over the production collaborators.
///
/// The conversation store starts empty; transcripts live for the life of
/// the process.
///
/// # Errors
///
/// Returns an error if the completion or speech client cannot be built.
pub fn build_orchestrator(
    config: &ServerConfig,
    telegram: Arc<TelegramClient>,
) -> Result<Orchestrator, ServerError> {
    let completion = OpenAiCompatibleClient::new(&config.groq_api_key, config.completion.clone())
        .map_err(|e| ServerError::Client {
            name: "completion",
            reason: e.to_string(),
        })?;

    let speech =
        GoogleTranslateTts::new(config.speech.clone()).map_err(|e| ServerError::Client {
            name: "speech",
            reason: e.to_string(),
        })?;

    Ok(Orchestrator::new(
        Arc::new(InMemoryConversationStore::new()),
        Arc::new(completion),
        telegram,
        Arc::new(speech),
    ))
}
