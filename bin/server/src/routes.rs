//! HTTP handlers.

use crate::app::AppState;
use crate::error::WebhookError;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::{debug, warn};
use voxbridge_messaging::Update;
use voxbridge_relay::DispatchError;

/// Body of the liveness endpoint.
pub const ROOT_MESSAGE: &str = "🚀 Telegram AI chatbot (Groq) is running!";

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({ "message": ROOT_MESSAGE }))
}

/// `POST /webhook/{token}`
///
/// The token is checked before the body is looked at. Acknowledges as soon
/// as the update is queued; updates that cannot be queued are dropped but
/// still acknowledged so the platform does not retry.
pub async fn webhook(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, WebhookError> {
    state
        .dispatch
        .authorize(&token)
        .map_err(|_| WebhookError::InvalidToken)?;

    let update: Update =
        serde_json::from_slice(&body).map_err(|e| WebhookError::InvalidBody {
            reason: e.to_string(),
        })?;

    match state.dispatch.accept(&token, update) {
        Ok(()) => debug!("Update queued"),
        Err(DispatchError::InvalidToken) => return Err(WebhookError::InvalidToken),
        Err(e) => warn!(error = %e, "Update dropped"),
    }

    Ok(Json(json!({ "ok": true })))
}

/// `POST /set_webhook`
///
/// Registers this server's webhook URL with the platform.
pub async fn set_webhook(State(state): State<AppState>) -> Result<Json<Value>, WebhookError> {
    state
        .telegram
        .set_webhook(&state.webhook_url)
        .await
        .map_err(|e| WebhookError::RegistrationFailed {
            reason: e.to_string(),
        })?;

    Ok(Json(json!({ "result": "Webhook set successfully" })))
}
