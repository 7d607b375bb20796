//! OpenAI-compatible chat-completions client.

use crate::backend::{CompletionBackend, CompletionConfig};
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use voxbridge_conversation::Message;

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible completion endpoint.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    api_key: String,
    config: CompletionConfig,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleClient {
    /// Creates a client that authenticates with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>, config: CompletionConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn send(&self, messages: &[Message]) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::ResponseParseFailed {
                reason: "response has no reply content".to_string(),
            })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatibleClient {
    #[instrument(skip(self, messages), fields(model = %self.config.model, messages = messages.len()))]
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        match self.send(messages).await {
            Ok(reply) => {
                debug!(reply_len = reply.len(), "completion succeeded");
                Ok(reply)
            }
            Err(e) => {
                error!(error = %e, "completion failed");
                Err(e)
            }
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
