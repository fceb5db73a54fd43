//! Conversation message types.
//!
//! This module contains the message record shown in the chat log and
//! persisted across restarts.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatReply, FailureKind, RequestFailure, Slots};

/// Text of the bot message appended when a request fails.
pub const FALLBACK_REPLY_TEXT: &str = "Sorry, something went wrong calling the chat API.";

/// Represents the author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Message produced from a chat API reply or failure.
    Bot,
}

/// Structured annotation attached to bot messages.
///
/// Fields absent in the chat response stay absent here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Slots>,
    /// Set only when `error` was produced by a failed request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

impl MessageMeta {
    /// Whether any of intent, tool or error is set.
    pub fn has_annotations(&self) -> bool {
        self.intent.is_some() || self.tool.is_some() || self.error.is_some()
    }
}

/// A single message in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Creation time in epoch milliseconds, bumped to stay unique.
    pub id: i64,
    pub role: MessageRole,
    pub text: String,
    #[serde(default)]
    pub meta: Option<MessageMeta>,
    /// Display timestamp captured at creation.
    pub time: String,
}

impl Message {
    /// Creates a user message. User messages never carry meta.
    pub fn user(id: i64, text: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            id,
            role: MessageRole::User,
            text: text.into(),
            meta: None,
            time: time.into(),
        }
    }

    /// Creates a bot message from a successful chat reply.
    pub fn bot_reply(id: i64, reply: ChatReply, time: impl Into<String>) -> Self {
        let ChatReply {
            reply,
            intent,
            tool,
            error,
            slots,
        } = reply;

        Self {
            id,
            role: MessageRole::Bot,
            text: reply,
            meta: Some(MessageMeta {
                intent,
                tool,
                error,
                slots,
                error_kind: None,
            }),
            time: time.into(),
        }
    }

    /// Creates the fallback bot message for a failed request.
    pub fn bot_failure(id: i64, failure: &RequestFailure, time: impl Into<String>) -> Self {
        Self {
            id,
            role: MessageRole::Bot,
            text: FALLBACK_REPLY_TEXT.to_string(),
            meta: Some(MessageMeta {
                error: Some(failure.to_string()),
                error_kind: Some(failure.kind()),
                ..MessageMeta::default()
            }),
            time: time.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_bot(&self) -> bool {
        self.role == MessageRole::Bot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message_has_no_meta() {
        let message = Message::user(1, "hello", "3:04:05 PM");
        assert!(message.is_user());
        assert!(message.meta.is_none());
    }

    #[test]
    fn test_bot_reply_copies_fields_verbatim() {
        let reply = ChatReply::new("hi").with_intent("greet");
        let message = Message::bot_reply(2, reply, "3:04:06 PM");

        assert!(message.is_bot());
        assert_eq!(message.text, "hi");
        let meta = message.meta.unwrap();
        assert_eq!(meta.intent.as_deref(), Some("greet"));
        assert!(meta.tool.is_none());
        assert!(meta.error.is_none());
        assert!(meta.slots.is_none());
        assert!(meta.error_kind.is_none());
    }

    #[test]
    fn test_bot_failure_carries_diagnostic_and_kind() {
        let failure = RequestFailure::Transport("connection refused".to_string());
        let message = Message::bot_failure(3, &failure, "3:04:07 PM");

        assert_eq!(message.text, FALLBACK_REPLY_TEXT);
        let meta = message.meta.unwrap();
        assert!(meta.error.unwrap().contains("connection refused"));
        assert_eq!(meta.error_kind, Some(FailureKind::Transport));
        assert!(meta.intent.is_none());
        assert!(meta.tool.is_none());
        assert!(meta.slots.is_none());
    }

    #[test]
    fn test_persisted_shape() {
        let failure = RequestFailure::Timeout { after_ms: 500 };
        let message = Message::bot_failure(7, &failure, "9:00:00 AM");
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["role"], json!("bot"));
        assert_eq!(value["meta"]["errorKind"], json!("timeout"));
        assert!(value["meta"].get("intent").is_none());

        let user = serde_json::to_value(Message::user(8, "x", "9:00:01 AM")).unwrap();
        assert_eq!(user["meta"], json!(null));
    }

    #[test]
    fn test_loads_record_without_meta_key() {
        let message: Message =
            serde_json::from_str(r#"{"id":1,"role":"user","text":"hi","time":"1:00:00 PM"}"#)
                .unwrap();
        assert!(message.meta.is_none());
    }
}
