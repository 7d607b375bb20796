//! Test doubles for the orchestrator's outbound seams.
//!
//! Each double records what it was asked to do so tests can assert on the
//! exact sequence of outbound calls without any network.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use voxbridge_ai::{CompletionBackend, LlmError};
use voxbridge_conversation::{ChatSession, ConversationStore, Message, StoreError, Transcript};
use voxbridge_core::ChatId;
use voxbridge_messaging::{Delivery, DeliveryError, VoiceNote};
use voxbridge_speech::{SpeechSynthesizer, SynthesisError};

/// Prefix used by [`ScriptedCompletion::echo`].
pub const ECHO_PREFIX: &str = "echo: ";

/// What [`ScriptedCompletion`] does when called.
#[derive(Debug, Clone)]
enum Script {
    Echo,
    Fail(LlmError),
    PanicOn(String),
}

/// Completion backend with a fixed behavior that records every transcript
/// it receives.
#[derive(Debug, Clone)]
pub struct ScriptedCompletion {
    script: Script,
    delay: Duration,
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedCompletion {
    /// Replies with `"echo: "` followed by the last user message.
    #[must_use]
    pub fn echo() -> Self {
        Self::with_script(Script::Echo)
    }

    /// Fails every call with `error`.
    #[must_use]
    pub fn failing(error: LlmError) -> Self {
        Self::with_script(Script::Fail(error))
    }

    /// Echoes, but panics when the last message is exactly `trigger`.
    #[must_use]
    pub fn panicking_on(trigger: impl Into<String>) -> Self {
        Self::with_script(Script::PanicOn(trigger.into()))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            calls: Arc::default(),
        }
    }

    /// Sleeps for `delay` before answering, widening race windows in tests.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Transcripts received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn echo_reply(messages: &[Message]) -> String {
        let last = messages.last().map(Message::content).unwrap_or_default();
        format!("{ECHO_PREFIX}{last}")
    }
}

#[async_trait]
impl CompletionBackend for ScriptedCompletion {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.script {
            Script::Echo => Ok(Self::echo_reply(messages)),
            Script::Fail(e) => Err(e.clone()),
            Script::PanicOn(trigger) => {
                let last = messages.last().map(Message::content);
                if last == Some(trigger.as_str()) {
                    panic!("scripted completion panic on {trigger:?}");
                }
                Ok(Self::echo_reply(messages))
            }
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// One call made to [`RecordingDelivery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Text { chat_id: ChatId, text: String },
    Voice { chat_id: ChatId, voice: VoiceNote },
}

/// Delivery double that records calls and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingDelivery {
    fail_text: bool,
    fail_voice: bool,
    calls: Arc<Mutex<Vec<Delivered>>>,
}

impl RecordingDelivery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `send_text` call fail (the call is still recorded).
    #[must_use]
    pub fn failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }

    /// Makes every `send_voice` call fail (the call is still recorded).
    #[must_use]
    pub fn failing_voice(mut self) -> Self {
        self.fail_voice = true;
        self
    }

    /// Calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Delivered> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Texts sent so far, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<(ChatId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Delivered::Text { chat_id, text } => Some((chat_id, text)),
                Delivered::Voice { .. } => None,
            })
            .collect()
    }

    fn record(&self, call: Delivered) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        self.record(Delivered::Text {
            chat_id,
            text: text.to_string(),
        });
        if self.fail_text {
            return Err(DeliveryError::RequestFailed {
                method: "sendMessage",
                reason: "connection reset".to_string(),
            });
        }
        Ok(())
    }

    async fn send_voice(&self, chat_id: ChatId, voice: VoiceNote) -> Result<(), DeliveryError> {
        self.record(Delivered::Voice { chat_id, voice });
        if self.fail_voice {
            return Err(DeliveryError::Status {
                method: "sendVoice",
                status: 400,
                body: "Bad Request".to_string(),
            });
        }
        Ok(())
    }
}

/// Synthesizer that returns the UTF-8 bytes of the text, or always fails.
#[derive(Debug, Clone, Default)]
pub struct FakeSpeech {
    fail: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeSpeech {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with [`SynthesisError::EmptyText`].
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Texts received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(text.to_string());
        }
        if self.fail {
            return Err(SynthesisError::EmptyText);
        }
        Ok(text.as_bytes().to_vec())
    }

    fn language(&self) -> &str {
        "en"
    }
}

/// Store whose every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

#[async_trait]
impl ConversationStore for UnavailableStore {
    async fn begin(&self, chat_id: ChatId) -> Result<ChatSession, StoreError> {
        Err(StoreError::Unavailable {
            chat_id,
            reason: "backend offline".to_string(),
        })
    }

    async fn record_exchange(
        &self,
        session: ChatSession,
        _user: &str,
        _assistant: &str,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable {
            chat_id: session.chat_id(),
            reason: "backend offline".to_string(),
        })
    }

    async fn snapshot(&self, chat_id: ChatId) -> Result<Option<Transcript>, StoreError> {
        Err(StoreError::Unavailable {
            chat_id,
            reason: "backend offline".to_string(),
        })
    }

    async fn chat_count(&self) -> Result<usize, StoreError> {
        Ok(0)
    }
}
