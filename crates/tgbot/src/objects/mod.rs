//! Bot API result objects.
//!
//! Plain serde mappers over the JSON the server returns. Fields added by
//! newer API versions are ignored unless a type keeps them explicitly.

pub mod chat;
pub mod message;
pub mod update;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use chat::{Chat, ChatMember, User};
pub use message::{File, Message, MessageEntity, PhotoSize, UserProfilePhotos};
pub use update::{CallbackQuery, Update, UpdateKind, WebhookInfo};

/// One row of a game's high score table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameHighScore {
    pub position: i64,
    pub user: User,
    pub score: i64,
}

/// Result of methods that edit a message.
///
/// Editing a message sent by the bot returns the edited message; editing an
/// inline message only returns `true`. `setGameScore` behaves the same way.
#[derive(Debug, Clone, PartialEq)]
pub enum EditResult {
    Edited(Message),
    Accepted,
}

impl EditResult {
    pub fn into_message(self) -> Option<Message> {
        match self {
            Self::Edited(message) => Some(message),
            Self::Accepted => None,
        }
    }
}

impl<'de> Deserialize<'de> for EditResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Message(Box<Message>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Ok(Self::Accepted),
            Repr::Flag(false) => Err(D::Error::custom("expected `true` or a Message")),
            Repr::Message(message) => Ok(Self::Edited(*message)),
        }
    }
}

/// An untyped result, for methods with no dedicated mapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnknownObject(pub Value);

impl UnknownObject {
    /// Returns a field of an object result.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for UnknownObject {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edit_result() {
        let accepted: EditResult = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(accepted, EditResult::Accepted);

        let edited: EditResult = serde_json::from_value(json!({
            "message_id": 9,
            "date": 0,
            "chat": {"id": 1, "type": "private"},
            "game": {"title": "g"}
        }))
        .unwrap();
        assert_eq!(edited.into_message().unwrap().message_id, 9);

        assert!(serde_json::from_value::<EditResult>(json!(false)).is_err());
    }
}
