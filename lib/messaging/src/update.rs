//! Inbound Telegram updates.
//!
//! Only the fields the bridge reads are modelled; everything else in the
//! Bot API payload is ignored during deserialization. Every field is
//! optional so a partial or unexpected update still parses and can be
//! discarded by the orchestrator instead of failing at the HTTP layer.

use serde::{Deserialize, Serialize};
use voxbridge_core::ChatId;

/// Username logged when the sender has none.
const ANONYMOUS_SENDER: &str = "user";

/// A webhook update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<IncomingMessage>,
}

/// The message carried by an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<Chat>,
    #[serde(default, rename = "from", skip_serializing_if = "Option::is_none")]
    pub sender: Option<Sender>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Update {
    /// Builds a text update, mostly useful in tests.
    #[must_use]
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            update_id: None,
            message: Some(IncomingMessage {
                text: Some(text.into()),
                chat: Some(Chat { id: chat_id }),
                sender: None,
            }),
        }
    }

    /// Returns the chat the update belongs to, if present.
    #[must_use]
    pub fn chat_id(&self) -> Option<ChatId> {
        self.message.as_ref()?.chat.as_ref().map(|chat| chat.id)
    }

    /// Returns the message text, treating an empty string as absent.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.message
            .as_ref()?
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    /// Returns the sender's username, or `"user"` when there is none.
    #[must_use]
    pub fn username(&self) -> &str {
        self.message
            .as_ref()
            .and_then(|m| m.sender.as_ref())
            .and_then(|s| s.username.as_deref())
            .unwrap_or(ANONYMOUS_SENDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bot_api_update_ignoring_unknown_fields() {
        let raw = r#"{
            "update_id": 10,
            "message": {
                "message_id": 1,
                "date": 1700000000,
                "text": "/start",
                "chat": {"id": 42, "type": "private"},
                "from": {"id": 5, "is_bot": false, "username": "x"}
            }
        }"#;

        let update: Update = serde_json::from_str(raw).expect("parse");
        assert_eq!(update.update_id, Some(10));
        assert_eq!(update.chat_id(), Some(ChatId::new(42)));
        assert_eq!(update.text_content(), Some("/start"));
        assert_eq!(update.username(), "x");
    }

    #[test]
    fn empty_object_parses_with_nothing_set() {
        let update: Update = serde_json::from_str("{}").expect("parse");
        assert_eq!(update.chat_id(), None);
        assert_eq!(update.text_content(), None);
        assert_eq!(update.username(), "user");
    }

    #[test]
    fn empty_text_counts_as_missing() {
        let update = Update::text(ChatId::new(1), "");
        assert_eq!(update.text_content(), None);
        assert_eq!(update.chat_id(), Some(ChatId::new(1)));
    }

    #[test]
    fn non_text_message_has_no_text() {
        let raw = r#"{"message": {"chat": {"id": 3}, "photo": []}}"#;
        let update: Update = serde_json::from_str(raw).expect("parse");
        assert_eq!(update.chat_id(), Some(ChatId::new(3)));
        assert_eq!(update.text_content(), None);
    }
}
