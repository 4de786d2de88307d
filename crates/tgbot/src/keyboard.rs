//! Reply markup: custom keyboards, inline keyboards and reply options.
//!
//! A [`ReplyMarkup`] converts into a [`ParamValue::Json`], so it can be
//! passed straight as the `reply_markup` parameter; the form encoder sends
//! it as a JSON string.
//!
//! ```rust
//! use tgbot::keyboard::{InlineKeyboardButton, ReplyMarkup};
//!
//! let markup = ReplyMarkup::inline([[
//!     InlineKeyboardButton::callback("Yes", "vote:yes"),
//!     InlineKeyboardButton::callback("No", "vote:no"),
//! ]]);
//! assert!(markup.to_string().starts_with(r#"{"inline_keyboard":"#));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use tgbot_core::ParamValue;

/// Any value accepted as `reply_markup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboardMarkup),
    Inline(InlineKeyboardMarkup),
    Remove(ReplyKeyboardRemove),
    ForceReply(ForceReply),
}

impl ReplyMarkup {
    /// A custom reply keyboard.
    pub fn keyboard<R, B>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = B>,
        B: Into<KeyboardButton>,
    {
        Self::Keyboard(ReplyKeyboardMarkup {
            keyboard: collect_rows(rows),
            resize_keyboard: None,
            one_time_keyboard: None,
            selective: None,
        })
    }

    /// An inline keyboard attached to the message.
    pub fn inline<R>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = InlineKeyboardButton>,
    {
        Self::Inline(InlineKeyboardMarkup {
            inline_keyboard: collect_rows(rows),
        })
    }

    /// Hides the current custom keyboard.
    pub fn remove() -> Self {
        Self::Remove(ReplyKeyboardRemove {
            remove_keyboard: true,
            selective: None,
        })
    }

    /// Asks the client to show a reply interface.
    pub fn force_reply() -> Self {
        Self::ForceReply(ForceReply {
            force_reply: true,
            selective: None,
        })
    }
}

fn collect_rows<R, B, T>(rows: R) -> Vec<Vec<T>>
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = B>,
    B: Into<T>,
{
    rows.into_iter()
        .map(|row| row.into_iter().map(Into::into).collect())
        .collect()
}

impl fmt::Display for ReplyMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<ReplyMarkup> for ParamValue {
    fn from(markup: ReplyMarkup) -> Self {
        serde_json::to_value(&markup).map_or(ParamValue::Null, ParamValue::Json)
    }
}

/// A custom keyboard shown instead of the letter keyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_keyboard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time_keyboard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
}

impl ReplyKeyboardMarkup {
    pub fn resize(mut self) -> Self {
        self.resize_keyboard = Some(true);
        self
    }

    pub fn one_time(mut self) -> Self {
        self.one_time_keyboard = Some(true);
        self
    }
}

/// A button of a custom keyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_contact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_location: Option<bool>,
}

impl KeyboardButton {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: None,
            request_location: None,
        }
    }
}

impl From<&str> for KeyboardButton {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for KeyboardButton {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// A keyboard attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// A button of an inline keyboard. Exactly one action field must be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_inline_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_inline_query_current_chat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay: Option<bool>,
}

impl InlineKeyboardButton {
    fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            callback_data: None,
            switch_inline_query: None,
            switch_inline_query_current_chat: None,
            pay: None,
        }
    }

    /// A button that sends `data` back in a callback query.
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            callback_data: Some(data.into()),
            ..Self::bare(text)
        }
    }

    /// A button that opens `url`.
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::bare(text)
        }
    }

    /// A button that starts an inline query in another chat.
    pub fn switch_inline_query(text: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            switch_inline_query: Some(query.into()),
            ..Self::bare(text)
        }
    }
}

/// Removes the custom keyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyKeyboardRemove {
    pub remove_keyboard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
}

/// Shows a reply interface to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceReply {
    pub force_reply: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyboard_json() {
        let markup = ReplyMarkup::keyboard([["a", "b"], ["c", "d"]]);
        assert_eq!(
            markup.to_string(),
            r#"{"keyboard":[[{"text":"a"},{"text":"b"}],[{"text":"c"},{"text":"d"}]]}"#
        );
    }

    #[test]
    fn test_param_value_is_json() {
        let value = ParamValue::from(ReplyMarkup::force_reply());
        assert_eq!(value, ParamValue::Json(json!({"force_reply": true})));
    }

    #[test]
    fn test_untagged_roundtrip_picks_variant() {
        let markup: ReplyMarkup =
            serde_json::from_value(json!({"remove_keyboard": true})).unwrap();
        assert_eq!(markup, ReplyMarkup::remove());
    }
}
