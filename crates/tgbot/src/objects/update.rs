//! Incoming updates and webhook state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tgbot_core::{ApiError, ApiResult};

use super::chat::User;
use super::message::Message;

/// An incoming update, from `getUpdates` or a webhook push.
///
/// At most one of the optional fields is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_channel_post: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_query: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_inline_result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_query: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_checkout_query: Option<Value>,
}

/// Which payload an [`Update`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    CallbackQuery,
    InlineQuery,
    ChosenInlineResult,
    ShippingQuery,
    PreCheckoutQuery,
    Unknown,
}

impl Update {
    /// Decodes the body of a webhook request.
    ///
    /// The payload is trusted as-is; nothing here checks that it came from
    /// Telegram.
    pub fn from_webhook_body(body: &[u8]) -> ApiResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| ApiError::Serialization(format!("invalid webhook update: {e}")))
    }

    /// Reports which payload is populated.
    pub fn kind(&self) -> UpdateKind {
        if self.message.is_some() {
            UpdateKind::Message
        } else if self.edited_message.is_some() {
            UpdateKind::EditedMessage
        } else if self.channel_post.is_some() {
            UpdateKind::ChannelPost
        } else if self.edited_channel_post.is_some() {
            UpdateKind::EditedChannelPost
        } else if self.callback_query.is_some() {
            UpdateKind::CallbackQuery
        } else if self.inline_query.is_some() {
            UpdateKind::InlineQuery
        } else if self.chosen_inline_result.is_some() {
            UpdateKind::ChosenInlineResult
        } else if self.shipping_query.is_some() {
            UpdateKind::ShippingQuery
        } else if self.pre_checkout_query.is_some() {
            UpdateKind::PreCheckoutQuery
        } else {
            UpdateKind::Unknown
        }
    }

    /// The message of any message-like update.
    pub fn any_message(&self) -> Option<&Message> {
        self.message
            .as_ref()
            .or(self.edited_message.as_ref())
            .or(self.channel_post.as_ref())
            .or(self.edited_channel_post.as_ref())
            .or_else(|| self.callback_query.as_ref()?.message.as_ref())
    }
}

/// A press on an inline keyboard button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    #[serde(default)]
    pub chat_instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_short_name: Option<String>,
}

/// Current webhook status, from `getWebhookInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookInfo {
    /// Empty when no webhook is set.
    pub url: String,
    pub has_custom_certificate: bool,
    pub pending_update_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_body() {
        let body = br#"{
            "update_id": 10,
            "callback_query": {
                "id": "q1",
                "from": {"id": 7, "is_bot": false, "first_name": "Bo"},
                "chat_instance": "ci",
                "data": "vote:yes",
                "message": {"message_id": 3, "date": 0, "chat": {"id": 7, "type": "private"}}
            }
        }"#;
        let update = Update::from_webhook_body(body).unwrap();
        assert_eq!(update.kind(), UpdateKind::CallbackQuery);
        assert_eq!(
            update.callback_query.as_ref().unwrap().data.as_deref(),
            Some("vote:yes")
        );
        assert_eq!(update.any_message().unwrap().message_id, 3);
    }

    #[test]
    fn test_webhook_body_rejects_garbage() {
        let err = Update::from_webhook_body(b"<html>").unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn test_unknown_kind() {
        let update = Update::from_webhook_body(br#"{"update_id": 1, "poll": {}}"#).unwrap();
        assert_eq!(update.kind(), UpdateKind::Unknown);
    }
}
