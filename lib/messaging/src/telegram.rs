//! Telegram Bot API client.

use crate::delivery::{Delivery, VoiceNote};
use crate::error::DeliveryError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, instrument};
use voxbridge_core::ChatId;

/// Public Bot API root.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Timeout for every Bot API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SetWebhook<'a> {
    url: &'a str,
}

/// Client for one bot, addressed by its token.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The token is a credential; keep it out of logs.
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Creates a client for the bot identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn check(
        method: &'static str,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<(), DeliveryError> {
        let response = result.map_err(|e| DeliveryError::RequestFailed {
            method,
            reason: e.without_url().to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Status {
            method,
            status: status.as_u16(),
            body,
        })
    }

    /// Registers `url` as the bot's webhook.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the platform rejects the URL.
    #[instrument(skip(self))]
    pub async fn set_webhook(&self, url: &str) -> Result<(), DeliveryError> {
        let result = self
            .http
            .post(self.method_url("setWebhook"))
            .json(&SetWebhook { url })
            .send()
            .await;

        match Self::check("setWebhook", result).await {
            Ok(()) => {
                info!(webhook_url = %url, "Webhook set successfully");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to set webhook");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Delivery for TelegramClient {
    #[instrument(skip(self, text), fields(chat_id = %chat_id))]
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        let result = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&SendMessage { chat_id, text })
            .send()
            .await;

        Self::check("sendMessage", result).await
    }

    #[instrument(skip(self, voice), fields(chat_id = %chat_id, bytes = voice.bytes.len()))]
    async fn send_voice(&self, chat_id: ChatId, voice: VoiceNote) -> Result<(), DeliveryError> {
        let part = Part::bytes(voice.bytes)
            .file_name(voice.file_name)
            .mime_str(&voice.mime_type)
            .map_err(|e| DeliveryError::RequestFailed {
                method: "sendVoice",
                reason: e.to_string(),
            })?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("voice", part);

        let result = self
            .http
            .post(self.method_url("sendVoice"))
            .multipart(form)
            .send()
            .await;

        Self::check("sendVoice", result).await
    }
}
