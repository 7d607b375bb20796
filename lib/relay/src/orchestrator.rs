//! Per-update reply pipeline.
//!
//! For a text message the orchestrator runs, in order:
//! 1. Begin a session on the chat (transcript created with the system prompt if new)
//! 2. Ask the completion backend for a reply to the transcript plus the new
//!    user message, substituting an apology on failure
//! 3. Record the user message and the reply together and release the chat
//! 4. Send the reply text
//! 5. Synthesize the reply and send it as a voice message
//!
//! Steps 1-3 hold the chat, so concurrent updates for one chat always leave
//! complete user/assistant pairs. Nothing is written until step 3; an update
//! that fails or panics before then leaves the transcript unchanged. Delivery
//! and synthesis failures are logged and never undo earlier steps.

use crate::error::RelayError;
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use voxbridge_ai::CompletionBackend;
use voxbridge_conversation::{ConversationStore, Message};
use voxbridge_core::ChatId;
use voxbridge_messaging::{Delivery, Update, VoiceNote};
use voxbridge_speech::SpeechSynthesizer;

/// Command answered with [`GREETING`] instead of a model reply.
pub const START_COMMAND: &str = "/start";

/// Canned reply to [`START_COMMAND`].
pub const GREETING: &str =
    "👋 Hey there! I’m your friendly AI chatbot powered by Groq (Llama 3). Just say something!";

/// Sent to the chat when processing fails outside reply generation.
pub const GENERIC_ERROR_REPLY: &str = "⚠️ An error occurred. Please try again later.";

/// What happened to an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The update had no chat or no text and was dropped.
    Ignored,
    /// The start command was answered with the greeting.
    Greeted,
    /// A reply was generated and recorded. Delivery is best-effort, so this
    /// only says whether a voice message made it out.
    Replied { voice_sent: bool },
}

/// Composes store, completion, delivery and speech for each update.
pub struct Orchestrator {
    store: Arc<dyn ConversationStore>,
    completion: Arc<dyn CompletionBackend>,
    delivery: Arc<dyn Delivery>,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl Orchestrator {
    /// Creates an orchestrator over the given collaborators.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        completion: Arc<dyn CompletionBackend>,
        delivery: Arc<dyn Delivery>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            store,
            completion,
            delivery,
            speech,
        }
    }

    /// Returns the conversation store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// Processes an update end to end.
    ///
    /// Never fails: when processing aborts, the failure is logged and, if the
    /// update names a chat, the chat receives [`GENERIC_ERROR_REPLY`].
    pub async fn handle_update(&self, update: &Update) {
        if let Err(report) = self.process(update).await {
            error!(error = %report, "Error processing update");
            self.report_failure(update).await;
        }
    }

    /// Tells the update's chat, if it has one, that processing failed.
    pub async fn report_failure(&self, update: &Update) {
        if let Some(chat_id) = update.chat_id() {
            self.send_text(chat_id, GENERIC_ERROR_REPLY).await;
        }
    }

    /// Runs the pipeline and reports how far it got.
    ///
    /// # Errors
    ///
    /// Returns an error only when the chat's transcript cannot be obtained.
    /// Completion, delivery and synthesis failures are absorbed.
    pub async fn process(&self, update: &Update) -> Result<Outcome, Report<RelayError>> {
        let (Some(chat_id), Some(text)) = (update.chat_id(), update.text_content()) else {
            debug!(update_id = ?update.update_id, "Ignoring update without chat or text");
            return Ok(Outcome::Ignored);
        };

        let user = update.username();
        info!(chat_id = %chat_id, user = %user, text = %text, "Message received");

        if text.to_lowercase() == START_COMMAND {
            self.send_text(chat_id, GREETING).await;
            return Ok(Outcome::Greeted);
        }

        let reply = self.generate_reply(chat_id, text).await?;

        self.send_text(chat_id, &reply).await;
        let voice_sent = self.send_voice(chat_id, &reply).await;
        if voice_sent {
            info!(chat_id = %chat_id, user = %user, "Sent voice reply");
        }

        Ok(Outcome::Replied { voice_sent })
    }

    /// Obtains a reply and records it with the user message.
    async fn generate_reply(
        &self,
        chat_id: ChatId,
        text: &str,
    ) -> Result<String, Report<RelayError>> {
        let session = self
            .store
            .begin(chat_id)
            .await
            .map_err(|source| RelayError::Store { chat_id, source })?;

        let mut context = session.transcript().messages().to_vec();
        context.push(Message::user(text));

        let reply = match self.completion.complete(&context).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "Completion failed, sending fallback reply");
                e.fallback_reply().to_string()
            }
        };

        self.store
            .record_exchange(session, text, &reply)
            .await
            .map_err(|source| RelayError::Store { chat_id, source })?;
        debug!(chat_id = %chat_id, messages = context.len() + 1, "Transcript updated");
        Ok(reply)
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.delivery.send_text(chat_id, text).await {
            error!(chat_id = %chat_id, error = %e, "Failed to send message");
        }
    }

    /// Returns whether the voice message was delivered.
    async fn send_voice(&self, chat_id: ChatId, text: &str) -> bool {
        let audio = match self.speech.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "Speech synthesis failed, skipping voice reply");
                return false;
            }
        };

        match self.delivery.send_voice(chat_id, VoiceNote::ogg(audio)).await {
            Ok(()) => true,
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to send voice reply");
                false
            }
        }
    }
}
