//! Conversation store: chat id → transcript.
//!
//! The store is injected into the orchestrator as a trait object so the
//! in-memory map can be swapped for a persistent backend. Work on one chat
//! happens inside a [`ChatSession`]: [`ConversationStore::begin`] waits for
//! exclusive use of the chat and hands back a copy of its transcript, and
//! [`ConversationStore::record_exchange`] appends the user message and its
//! reply in one step before releasing the chat.
//!
//! A session dropped without being recorded leaves the transcript as it was,
//! so an update abandoned halfway (error or panic) never leaves a user
//! message without its reply.

use crate::error::StoreError;
use crate::transcript::Transcript;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use voxbridge_core::ChatId;

/// Exclusive use of one chat, plus the transcript as it stood when the
/// session began.
///
/// The chat stays reserved until the session is recorded or dropped.
pub struct ChatSession {
    transcript: Transcript,
    _lease: Box<dyn Send>,
}

impl ChatSession {
    /// Wraps a loaded transcript and whatever keeps the chat reserved.
    ///
    /// `lease` is dropped when the session ends; backends use it to hold a
    /// lock guard, a row lock, or nothing at all.
    pub fn new(transcript: Transcript, lease: impl Send + 'static) -> Self {
        Self {
            transcript,
            _lease: Box::new(lease),
        }
    }

    #[must_use]
    pub fn chat_id(&self) -> ChatId {
        self.transcript.chat_id()
    }

    /// The transcript at the start of the session.
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("chat_id", &self.chat_id())
            .field("messages", &self.transcript.len())
            .finish_non_exhaustive()
    }
}

/// Trait for conversation storage.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Reserves `chat_id`, creating its transcript seeded with the system
    /// prompt if the chat has not been seen before.
    ///
    /// Waits while another session holds the same chat.
    async fn begin(&self, chat_id: ChatId) -> Result<ChatSession, StoreError>;

    /// Appends `user` and `assistant` to the session's chat and releases it.
    async fn record_exchange(
        &self,
        session: ChatSession,
        user: &str,
        assistant: &str,
    ) -> Result<(), StoreError>;

    /// Returns a copy of the transcript for `chat_id`, if one exists.
    async fn snapshot(&self, chat_id: ChatId) -> Result<Option<Transcript>, StoreError>;

    /// Returns the number of chats with a transcript.
    async fn chat_count(&self) -> Result<usize, StoreError>;
}

#[derive(Debug)]
struct ChatSlot {
    gate: Arc<tokio::sync::Mutex<()>>,
    transcript: Mutex<Transcript>,
}

/// Process-lifetime, in-memory conversation store.
///
/// Entries are created lazily and never removed.
#[derive(Debug, Default, Clone)]
pub struct InMemoryConversationStore {
    chats: Arc<RwLock<HashMap<ChatId, Arc<ChatSlot>>>>,
}

impl InMemoryConversationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn existing(&self, chat_id: ChatId) -> Result<Option<Arc<ChatSlot>>, StoreError> {
        let chats = self.chats.read().map_err(|_| StoreError::Poisoned)?;
        Ok(chats.get(&chat_id).cloned())
    }

    fn get_or_insert(&self, chat_id: ChatId) -> Result<Arc<ChatSlot>, StoreError> {
        if let Some(slot) = self.existing(chat_id)? {
            return Ok(slot);
        }

        let mut chats = self.chats.write().map_err(|_| StoreError::Poisoned)?;
        let slot = chats.entry(chat_id).or_insert_with(|| {
            tracing::debug!(chat_id = %chat_id, "Starting new transcript");
            Arc::new(ChatSlot {
                gate: Arc::default(),
                transcript: Mutex::new(Transcript::new(chat_id)),
            })
        });
        Ok(Arc::clone(slot))
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn begin(&self, chat_id: ChatId) -> Result<ChatSession, StoreError> {
        // The index lock is released before waiting on the chat.
        let slot = self.get_or_insert(chat_id)?;
        let lease = Arc::clone(&slot.gate).lock_owned().await;
        let transcript = slot
            .transcript
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .clone();
        Ok(ChatSession::new(transcript, lease))
    }

    async fn record_exchange(
        &self,
        session: ChatSession,
        user: &str,
        assistant: &str,
    ) -> Result<(), StoreError> {
        let chat_id = session.chat_id();
        let slot = self
            .existing(chat_id)?
            .ok_or_else(|| StoreError::Unavailable {
                chat_id,
                reason: "session for a chat this store never started".to_string(),
            })?;

        {
            let mut transcript = slot.transcript.lock().map_err(|_| StoreError::Poisoned)?;
            transcript.push_exchange(user, assistant);
        }
        drop(session);
        Ok(())
    }

    async fn snapshot(&self, chat_id: ChatId) -> Result<Option<Transcript>, StoreError> {
        match self.existing(chat_id)? {
            Some(slot) => {
                let transcript = slot.transcript.lock().map_err(|_| StoreError::Poisoned)?;
                Ok(Some(transcript.clone()))
            }
            None => Ok(None),
        }
    }

    async fn chat_count(&self) -> Result<usize, StoreError> {
        let chats = self.chats.read().map_err(|_| StoreError::Poisoned)?;
        Ok(chats.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, MessageRole};
    use crate::transcript::SYSTEM_PROMPT;
    use std::time::Duration;

    #[tokio::test]
    async fn unseen_chat_is_seeded_with_system_prompt() {
        let store = InMemoryConversationStore::new();
        assert!(store.snapshot(ChatId::new(1)).await.unwrap().is_none());

        let session = store.begin(ChatId::new(1)).await.unwrap();
        assert_eq!(
            session.transcript().messages(),
            [Message::system(SYSTEM_PROMPT)]
        );
        drop(session);

        assert_eq!(store.chat_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn recorded_exchange_is_visible_to_later_sessions() {
        let store = InMemoryConversationStore::new();
        let chat = ChatId::new(3);

        let session = store.begin(chat).await.unwrap();
        store
            .record_exchange(session, "hi", "hello")
            .await
            .unwrap();

        let session = store.begin(chat).await.unwrap();
        assert_eq!(session.transcript().len(), 3);
        assert_eq!(
            session.transcript().messages()[2].role(),
            MessageRole::Assistant
        );
    }

    #[tokio::test]
    async fn dropped_session_leaves_transcript_untouched() {
        let store = InMemoryConversationStore::new();
        let chat = ChatId::new(4);

        let session = store.begin(chat).await.unwrap();
        store.record_exchange(session, "one", "1").await.unwrap();

        let abandoned = store.begin(chat).await.unwrap();
        drop(abandoned);

        let snapshot = store.snapshot(chat).await.unwrap().expect("present");
        assert_eq!(snapshot.len(), 3);

        // The chat is free again.
        let next = tokio::time::timeout(Duration::from_secs(1), store.begin(chat))
            .await
            .expect("chat should be released when the session is dropped");
        assert!(next.is_ok());
    }

    #[tokio::test]
    async fn chats_are_independent() {
        let store = InMemoryConversationStore::new();

        let _first = store.begin(ChatId::new(1)).await.unwrap();
        // A different chat must not block while the first is held.
        let second = tokio::time::timeout(Duration::from_secs(1), store.begin(ChatId::new(2)))
            .await
            .expect("second chat should not wait on the first");
        assert!(second.is_ok());
        assert_eq!(store.chat_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn same_chat_is_serialized() {
        let store = InMemoryConversationStore::new();
        let chat = ChatId::new(7);

        let held = store.begin(chat).await.unwrap();

        let contender = {
            let store = store.clone();
            tokio::spawn(async move {
                let session = store.begin(chat).await.unwrap();
                assert_eq!(session.transcript().len(), 3);
                store
                    .record_exchange(session, "bye", "reply to bye")
                    .await
                    .unwrap();
            })
        };

        // Give the contender a chance to run; it must still be waiting.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        store
            .record_exchange(held, "hi", "reply to hi")
            .await
            .unwrap();
        contender.await.unwrap();

        let snapshot = store.snapshot(chat).await.unwrap().expect("present");
        let contents: Vec<_> = snapshot.messages().iter().map(Message::content).collect();
        assert_eq!(
            contents,
            [SYSTEM_PROMPT, "hi", "reply to hi", "bye", "reply to bye"]
        );
    }
}
