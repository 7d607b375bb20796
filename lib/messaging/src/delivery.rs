//! Outbound delivery seam.

use crate::error::DeliveryError;
use async_trait::async_trait;
use voxbridge_core::ChatId;

/// An audio attachment to be sent as a voice message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceNote {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl VoiceNote {
    /// Wraps synthesized audio under the file name and type the platform
    /// expects for voice replies (`voice.ogg`, `audio/ogg`).
    #[must_use]
    pub fn ogg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: "voice.ogg".to_string(),
            mime_type: "audio/ogg".to_string(),
        }
    }
}

/// Sends replies to a chat on the messaging platform.
///
/// Calls are never retried. Callers decide what a failure means; the
/// orchestrator logs it and moves on.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Sends a plain text message.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError>;

    /// Sends an audio attachment as a voice message.
    async fn send_voice(&self, chat_id: ChatId, voice: VoiceNote) -> Result<(), DeliveryError>;
}
