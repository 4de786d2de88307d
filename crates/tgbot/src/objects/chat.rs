//! Users, chats and chat members.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Telegram user or bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Whether this user is a bot.
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// IETF language tag of the user's language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// A private chat, group, supergroup or channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique identifier.
    pub id: i64,
    /// One of "private", "group", "supergroup" or "channel".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_members_are_administrators: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_link: Option<String>,
}

impl Chat {
    /// Returns `true` for one-to-one chats.
    pub fn is_private(&self) -> bool {
        self.kind == "private"
    }
}

/// A member of a chat.
///
/// Permission flags vary between member kinds and API versions; they are
/// kept in `permissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMember {
    pub user: User,
    /// "creator", "administrator", "member", "restricted", "left" or "kicked".
    pub status: String,
    /// Unix time when restrictions are lifted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until_date: Option<i64>,
    #[serde(flatten)]
    pub permissions: Map<String, Value>,
}

impl ChatMember {
    /// Returns `true` for the creator and administrators.
    pub fn is_admin(&self) -> bool {
        matches!(self.status.as_str(), "creator" | "administrator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_member_keeps_permissions() {
        let member: ChatMember = serde_json::from_value(json!({
            "user": {"id": 1, "is_bot": false, "first_name": "Ann"},
            "status": "administrator",
            "can_delete_messages": true
        }))
        .unwrap();
        assert!(member.is_admin());
        assert_eq!(member.permissions["can_delete_messages"], json!(true));
    }

    #[test]
    fn test_chat_type_field() {
        let chat: Chat = serde_json::from_value(json!({"id": -100, "type": "supergroup", "title": "g"}))
            .unwrap();
        assert_eq!(chat.kind, "supergroup");
        assert!(!chat.is_private());
    }
}
