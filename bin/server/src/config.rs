//! Centralized server configuration.
//!
//! Loaded via the `config` crate from the process environment. Top-level
//! keys map from plain variables (`GROQ_API_KEY`, `PORT`); nested sections
//! use a double underscore (`COMPLETION__MODEL`, `DISPATCH__WORKERS`).
//!
//! See [`CompletionConfig`], [`DispatchConfig`] and [`SpeechConfig`] for the
//! section defaults.

use crate::error::ServerError;
use serde::Deserialize;
use voxbridge_ai::CompletionConfig;
use voxbridge_messaging::DEFAULT_API_BASE;
use voxbridge_relay::DispatchConfig;
use voxbridge_speech::SpeechConfig;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Bearer credential for the completion API.
    #[serde(default)]
    pub groq_api_key: String,

    /// Bot token. Also the secret path segment of the webhook URL.
    #[serde(default)]
    pub telegram_token: String,

    /// Public base URL the platform should deliver updates to.
    #[serde(default)]
    pub webhook_base: String,

    /// Carried for operators; routing authenticates with the bot token.
    #[serde(default = "default_webhook_path_secret")]
    pub webhook_path_secret: String,

    /// Listen address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Bot API settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramConfig {
    /// Bot API root.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_webhook_path_secret() -> String {
    "secret123".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but cannot be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Checks that both credentials are present.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::MissingCredential`] naming the first variable
    /// that is missing or blank.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.groq_api_key.trim().is_empty() {
            return Err(ServerError::MissingCredential {
                name: "GROQ_API_KEY",
            });
        }
        if self.telegram_token.trim().is_empty() {
            return Err(ServerError::MissingCredential {
                name: "TELEGRAM_TOKEN",
            });
        }
        Ok(())
    }

    /// Address to bind, as `host:port`.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL registered with the platform for update delivery.
    #[must_use]
    pub fn webhook_url(&self) -> String {
        webhook_url(&self.webhook_base, &self.telegram_token)
    }
}

/// Joins the public base and the bot token into the webhook URL.
#[must_use]
pub fn webhook_url(base: &str, token: &str) -> String {
    format!("{}/webhook/{}", base.trim_end_matches('/'), token)
}
