//! Speech synthesizer abstraction.

use crate::error::SynthesisError;
use async_trait::async_trait;

/// Trait for text-to-speech engines.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` and returns the encoded audio bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the text has nothing speakable or the engine fails.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;

    /// Returns the language the engine speaks.
    fn language(&self) -> &str;
}
