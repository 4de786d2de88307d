//! Typed Bot API methods.
//!
//! Each method takes the endpoint's required parameters as arguments and
//! the optional ones as a trailing [`Params`], e.g.
//!
//! ```rust,ignore
//! use tgbot::{Params, ReplyMarkup, params};
//!
//! api.send_message(chat_id, "*hi*", params! {
//!     "parse_mode" => "Markdown",
//!     "reply_markup" => ReplyMarkup::force_reply(),
//! }).await?;
//! ```
//!
//! Methods with upload slots (`photo`, `audio`, `document`, `sticker`,
//! `video`, `voice`, `video_note`, `certificate`) accept a `file_id`, an
//! absolute URL, a local path or an [`InputFile`](tgbot_core::InputFile).

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

use tgbot_core::{ApiResponse, ApiResult, InputFile, ParamValue, Params, ValidationError, parse_absolute_url};

use crate::api::Api;
use crate::objects::{
    Chat, ChatMember, EditResult, File, GameHighScore, Message, Update, User, UserProfilePhotos,
    WebhookInfo,
};
use crate::outcome::Outcome;

/// Actions accepted by `sendChatAction`.
pub const CHAT_ACTIONS: [&str; 10] = [
    "typing",
    "upload_photo",
    "record_video",
    "upload_video",
    "record_audio",
    "upload_audio",
    "upload_document",
    "find_location",
    "record_video_note",
    "upload_video_note",
];

pub(crate) fn decode_result<T: DeserializeOwned>(response: &ApiResponse) -> ApiResult<T> {
    response.decode_result()
}

macro_rules! impl_api {
    // Endpoint with required arguments and, after `;`, an optional-parameter set
    (
        $(#[$meta:meta])*
        $name:ident => $endpoint:literal,
        ($($arg:ident: $typ:ty),* $(; $options:ident)?) -> $ret:ty
        $(, files: [$($file:literal),+])?
        $(,)?
    ) => {
        $(#[$meta])*
        pub async fn $name(&self, $($arg: $typ,)* $($options: Params)?) -> ApiResult<Outcome<$ret>> {
            #[allow(unused_mut)]
            let mut params = Params::new()$(.with(stringify!($arg), $arg))*;
            $( params.extend($options); )?
            self.invoke($endpoint, params, &[$($($file),+)?], decode_result::<$ret>)
                .await
        }
    };
}

impl Api {
    // =========================================================================
    // Basic
    // =========================================================================

    impl_api!(
        /// Returns the bot's own user.
        get_me => "getMe", () -> User
    );

    impl_api!(
        /// Sends a text message.
        send_message => "sendMessage",
        (chat_id: impl Into<ParamValue>, text: &str; options) -> Message
    );

    impl_api!(
        /// Forwards a message of any kind.
        forward_message => "forwardMessage",
        (chat_id: impl Into<ParamValue>, from_chat_id: impl Into<ParamValue>, message_id: i64; options) -> Message
    );

    // =========================================================================
    // Media
    // =========================================================================

    impl_api!(
        /// Sends a photo.
        send_photo => "sendPhoto",
        (chat_id: impl Into<ParamValue>, photo: impl Into<ParamValue>; options) -> Message,
        files: ["photo"]
    );

    impl_api!(
        /// Sends an audio file to be shown in the music player.
        send_audio => "sendAudio",
        (chat_id: impl Into<ParamValue>, audio: impl Into<ParamValue>; options) -> Message,
        files: ["audio"]
    );

    impl_api!(
        /// Sends a general file.
        send_document => "sendDocument",
        (chat_id: impl Into<ParamValue>, document: impl Into<ParamValue>; options) -> Message,
        files: ["document"]
    );

    impl_api!(
        /// Sends an mp4 video.
        send_video => "sendVideo",
        (chat_id: impl Into<ParamValue>, video: impl Into<ParamValue>; options) -> Message,
        files: ["video"]
    );

    impl_api!(
        /// Sends an OGG/Opus voice message.
        send_voice => "sendVoice",
        (chat_id: impl Into<ParamValue>, voice: impl Into<ParamValue>; options) -> Message,
        files: ["voice"]
    );

    impl_api!(
        /// Sends a rounded square mp4 video message.
        send_video_note => "sendVideoNote",
        (chat_id: impl Into<ParamValue>, video_note: impl Into<ParamValue>; options) -> Message,
        files: ["video_note"]
    );

    /// Sends a `.webp` sticker.
    ///
    /// A local file with any other extension is rejected before dispatch.
    pub async fn send_sticker(
        &self,
        chat_id: impl Into<ParamValue>,
        sticker: impl Into<ParamValue>,
        options: Params,
    ) -> ApiResult<Outcome<Message>> {
        let mut params = Params::new()
            .with("chat_id", chat_id)
            .with("sticker", sticker);
        params.extend(options);
        // Checked after the merge so `options` cannot swap in another file.
        if let Some(sticker) = params.get("sticker") {
            ensure_webp(sticker).await?;
        }
        self.invoke("sendSticker", params, &["sticker"], decode_result::<Message>)
            .await
    }

    impl_api!(
        /// Sends a point on the map.
        send_location => "sendLocation",
        (chat_id: impl Into<ParamValue>, latitude: f64, longitude: f64; options) -> Message
    );

    impl_api!(
        /// Sends information about a venue.
        send_venue => "sendVenue",
        (chat_id: impl Into<ParamValue>, latitude: f64, longitude: f64, title: &str, address: &str; options) -> Message
    );

    impl_api!(
        /// Sends a phone contact.
        send_contact => "sendContact",
        (chat_id: impl Into<ParamValue>, phone_number: &str, first_name: &str; options) -> Message
    );

    /// Tells the user that something is happening on the bot's side.
    ///
    /// `action` must be one of [`CHAT_ACTIONS`]; anything else fails
    /// validation without a request being sent.
    pub async fn send_chat_action(
        &self,
        chat_id: impl Into<ParamValue>,
        action: &str,
    ) -> ApiResult<Outcome<bool>> {
        if !CHAT_ACTIONS.contains(&action) {
            return Err(ValidationError::unsupported("action", action, CHAT_ACTIONS).into());
        }
        let params = Params::new()
            .with("chat_id", chat_id)
            .with("action", action);
        self.invoke("sendChatAction", params, &[], decode_result::<bool>)
            .await
    }

    // =========================================================================
    // Games
    // =========================================================================

    impl_api!(
        /// Sends a game.
        send_game => "sendGame",
        (chat_id: impl Into<ParamValue>, game_short_name: &str; options) -> Message
    );

    impl_api!(
        /// Sets a user's score. Identify the game message in `options`.
        set_game_score => "setGameScore",
        (user_id: i64, score: i64; options) -> EditResult
    );

    impl_api!(
        /// Returns the high score table around a user.
        get_game_high_scores => "getGameHighScores",
        (user_id: i64; options) -> Vec<GameHighScore>
    );

    // =========================================================================
    // Payments
    // =========================================================================

    impl_api!(
        /// Sends an invoice. `prices` is a JSON array of labeled prices.
        send_invoice => "sendInvoice",
        (
            chat_id: impl Into<ParamValue>,
            title: &str,
            description: &str,
            payload: &str,
            provider_token: &str,
            start_parameter: &str,
            currency: &str,
            prices: Value;
            options
        ) -> Message
    );

    impl_api!(
        /// Replies to a shipping query.
        answer_shipping_query => "answerShippingQuery",
        (shipping_query_id: &str, ok: bool; options) -> bool
    );

    impl_api!(
        /// Replies to a pre-checkout query.
        answer_pre_checkout_query => "answerPreCheckoutQuery",
        (pre_checkout_query_id: &str, ok: bool; options) -> bool
    );

    // =========================================================================
    // Users, files and chats
    // =========================================================================

    impl_api!(
        /// Returns a user's profile pictures.
        get_user_profile_photos => "getUserProfilePhotos",
        (user_id: i64; options) -> UserProfilePhotos
    );

    impl_api!(
        /// Prepares a file for download. See [`Api::file_url`].
        get_file => "getFile",
        (file_id: &str) -> File
    );

    impl_api!(
        kick_chat_member => "kickChatMember",
        (chat_id: impl Into<ParamValue>, user_id: i64; options) -> bool
    );

    impl_api!(
        leave_chat => "leaveChat",
        (chat_id: impl Into<ParamValue>) -> bool
    );

    impl_api!(
        unban_chat_member => "unbanChatMember",
        (chat_id: impl Into<ParamValue>, user_id: i64) -> bool
    );

    impl_api!(
        get_chat => "getChat",
        (chat_id: impl Into<ParamValue>) -> Chat
    );

    impl_api!(
        /// Lists the chat's administrators, other bots excluded.
        get_chat_administrators => "getChatAdministrators",
        (chat_id: impl Into<ParamValue>) -> Vec<ChatMember>
    );

    impl_api!(
        get_chat_members_count => "getChatMembersCount",
        (chat_id: impl Into<ParamValue>) -> i64
    );

    impl_api!(
        get_chat_member => "getChatMember",
        (chat_id: impl Into<ParamValue>, user_id: i64) -> ChatMember
    );

    // =========================================================================
    // Callbacks, inline mode and editing
    // =========================================================================

    impl_api!(
        /// Answers a callback query from an inline keyboard.
        answer_callback_query => "answerCallbackQuery",
        (callback_query_id: &str; options) -> bool
    );

    /// Answers an inline query.
    ///
    /// Structured `results` are sent as a JSON string.
    pub async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: impl Into<ParamValue>,
        options: Params,
    ) -> ApiResult<Outcome<bool>> {
        let results: ParamValue = results.into();
        let mut params = Params::new()
            .with("inline_query_id", inline_query_id)
            .with("results", results.into_stringified());
        params.extend(options);
        self.invoke("answerInlineQuery", params, &[], decode_result::<bool>)
            .await
    }

    impl_api!(
        /// Edits a text message. Identify the message in `options`.
        edit_message_text => "editMessageText",
        (text: &str; options) -> EditResult
    );

    impl_api!(
        edit_message_caption => "editMessageCaption",
        (; options) -> EditResult
    );

    impl_api!(
        edit_message_reply_markup => "editMessageReplyMarkup",
        (; options) -> EditResult
    );

    impl_api!(
        delete_message => "deleteMessage",
        (chat_id: impl Into<ParamValue>, message_id: i64) -> bool
    );

    // =========================================================================
    // Updates
    // =========================================================================

    /// Receives updates by long polling.
    ///
    /// A response without a `result` yields no updates.
    pub async fn get_updates(&self, options: Params) -> ApiResult<Outcome<Vec<Update>>> {
        self.invoke("getUpdates", options, &[], |response: &ApiResponse| {
            if response.result().is_null() {
                return Ok(Vec::new());
            }
            response.decode_result()
        })
        .await
    }

    /// Registers a webhook.
    ///
    /// `url` must be an absolute HTTPS URL; anything else fails validation
    /// without a request being sent. A self-signed `certificate` is uploaded
    /// when given.
    pub async fn set_webhook(
        &self,
        url: &str,
        certificate: Option<InputFile>,
        options: Params,
    ) -> ApiResult<Outcome<bool>> {
        let mut params = Params::new()
            .with("url", url)
            .with("certificate", certificate);
        params.extend(options);
        let url = params
            .get("url")
            .and_then(ParamValue::to_form_string)
            .ok_or_else(|| ValidationError::MissingParam("url".to_string()))?;
        ensure_https(&url)?;
        self.invoke("setWebhook", params, &["certificate"], decode_result::<bool>)
            .await
    }

    impl_api!(
        /// Removes the webhook, switching back to `getUpdates`.
        delete_webhook => "deleteWebhook", () -> bool
    );

    /// Alias of [`Api::delete_webhook`].
    pub async fn remove_webhook(&self) -> ApiResult<Outcome<bool>> {
        self.delete_webhook().await
    }

    impl_api!(
        get_webhook_info => "getWebhookInfo", () -> WebhookInfo
    );
}

fn ensure_https(url: &str) -> Result<(), ValidationError> {
    let parsed = parse_absolute_url(url).ok_or_else(|| ValidationError::InvalidUrl {
        url: url.to_string(),
    })?;
    if parsed.scheme() != "https" {
        return Err(ValidationError::InsecureUrl {
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Rejects local sticker files that are not `.webp`.
async fn ensure_webp(sticker: &ParamValue) -> Result<(), ValidationError> {
    let path = match sticker {
        ParamValue::File(InputFile::Path(path)) => path.as_path(),
        ParamValue::Str(text) => Path::new(text),
        _ => return Ok(()),
    };
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    let is_webp = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("webp"));
    if is_file && !is_webp {
        return Err(ValidationError::InvalidFileFormat {
            param: "sticker".to_string(),
            expected: "webp".to_string(),
        });
    }
    Ok(())
}
