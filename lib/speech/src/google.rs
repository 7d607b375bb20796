//! Google Translate text-to-speech.
//!
//! The translate TTS endpoint only accepts short inputs, so reply text is
//! packed into chunks of at most [`MAX_CHUNK_CHARS`] characters on word
//! boundaries. Each chunk is fetched in order and the returned MP3 frames are
//! concatenated, which yields a single playable stream.

use crate::error::SynthesisError;
use crate::synthesizer::SpeechSynthesizer;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Longest input the endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Public translate host.
pub const DEFAULT_TTS_BASE: &str = "https://translate.google.com";

/// Speech synthesis settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpeechConfig {
    /// Language code passed as `tl`.
    #[serde(default = "default_language")]
    pub language: String,
    /// Host serving `/translate_tts`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout per chunk request, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_base_url() -> String {
    DEFAULT_TTS_BASE.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Synthesizer backed by the translate TTS endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslateTts {
    http: reqwest::Client,
    config: SpeechConfig,
}

impl GoogleTranslateTts {
    /// Creates a synthesizer.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: SpeechConfig) -> Result<Self, SynthesisError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SynthesisError::InvalidConfig {
                reason: e.to_string(),
            })?;
        Ok(Self { http, config })
    }

    async fn fetch_chunk(
        &self,
        index: usize,
        total: usize,
        chunk: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        let url = format!(
            "{}/translate_tts",
            self.config.base_url.trim_end_matches('/')
        );
        let total = total.to_string();
        let idx = index.to_string();
        let response = self
            .http
            .get(url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.config.language.as_str()),
                ("q", chunk),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                chunk: index,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    #[instrument(skip(self, text), fields(lang = %self.config.language, text_len = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let chunks = split_for_speech(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let mut audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(index, chunks.len(), chunk).await?);
        }

        debug!(chunks = chunks.len(), bytes = audio.len(), "synthesized speech");
        Ok(audio)
    }

    fn language(&self) -> &str {
        &self.config.language
    }
}

/// Packs words into chunks of at most `max_chars` characters.
///
/// Words longer than `max_chars` are split mid-word. Chunks with no
/// alphanumeric character (bare punctuation, emoji) are dropped because the
/// endpoint has nothing to pronounce for them.
#[must_use]
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks.retain(|chunk| chunk.chars().any(char::is_alphanumeric));
    chunks
}
