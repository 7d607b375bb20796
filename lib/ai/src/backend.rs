//! Completion backend abstraction.

use crate::error::LlmError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use voxbridge_conversation::Message;

/// Default OpenAI-compatible API root (Groq).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Model selection and sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionConfig {
    /// API root, without the trailing `/chat/completions`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Whole-request timeout, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_temperature() -> f32 {
    0.8
}

fn default_timeout_seconds() -> u64 {
    60
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl CompletionConfig {
    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Overrides the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Trait for completion backends.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generates the assistant reply for an ordered transcript.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unreachable, answers with a
    /// non-success status, or returns a body without reply text.
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// Returns the model name.
    fn model(&self) -> &str;
}
