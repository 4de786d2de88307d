//! Messages and the media they carry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::chat::{Chat, User};

/// A message.
///
/// The commonly used fields are typed; every other field the server sends
/// (stickers, games, payments, service messages, ...) is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    /// Unix time the message was sent.
    pub date: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_from: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo: Vec<PhotoSize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Returns the text, or the caption for media messages.
    pub fn text_or_caption(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    /// Returns `true` if the message starts with a bot command entity.
    pub fn is_command(&self) -> bool {
        self.entities
            .iter()
            .any(|e| e.kind == "bot_command" && e.offset == 0)
    }

    /// Returns a field not covered by the typed ones.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

/// A special entity in a text message (hashtag, URL, command, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: i64,
    pub length: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// One size of a photo or thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

/// A file ready to be downloaded.
///
/// Download it from the URL built by
/// [`Api::file_url`](crate::Api::file_url).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// A user's profile pictures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfilePhotos {
    pub total_count: i64,
    /// Up to four sizes for each picture.
    pub photos: Vec<Vec<PhotoSize>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_keeps_unknown_fields() {
        let message: Message = serde_json::from_value(json!({
            "message_id": 5,
            "date": 1500000000,
            "chat": {"id": 42, "type": "private", "first_name": "Ann"},
            "text": "/start now",
            "entities": [{"type": "bot_command", "offset": 0, "length": 6}],
            "sticker": {"file_id": "abc", "width": 512, "height": 512}
        }))
        .unwrap();

        assert!(message.is_command());
        assert_eq!(message.text_or_caption(), Some("/start now"));
        assert_eq!(message.field("sticker").unwrap()["file_id"], "abc");
        assert!(message.photo.is_empty());
    }

    #[test]
    fn test_reply_chain() {
        let message: Message = serde_json::from_value(json!({
            "message_id": 2,
            "date": 0,
            "chat": {"id": 1, "type": "private"},
            "reply_to_message": {"message_id": 1, "date": 0, "chat": {"id": 1, "type": "private"}, "caption": "pic"}
        }))
        .unwrap();
        let parent = message.reply_to_message.unwrap();
        assert_eq!(parent.message_id, 1);
        assert_eq!(parent.text_or_caption(), Some("pic"));
    }
}
