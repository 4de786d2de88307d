//! Name-based dispatch for methods without a typed wrapper.
//!
//! [`Api::call`] sends any Bot API method by name. For getters (`getXxx`)
//! the result is mapped through a fixed table keyed by the name's suffix;
//! everything else comes back as an [`UnknownObject`].
//!
//! Prefer the typed methods where one exists.

use tgbot_core::{ApiResponse, ApiResult, Params};
use tracing::trace;

use crate::api::Api;
use crate::objects::{
    Chat, ChatMember, File, GameHighScore, UnknownObject, Update, User, UserProfilePhotos,
    WebhookInfo,
};
use crate::outcome::Outcome;

const GETTER_PREFIX: &str = "get";

/// A result mapped through the getter table.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedObject {
    Me(User),
    Chat(Chat),
    File(File),
    ChatMember(ChatMember),
    ChatAdministrators(Vec<ChatMember>),
    UserProfilePhotos(UserProfilePhotos),
    WebhookInfo(WebhookInfo),
    Updates(Vec<Update>),
    GameHighScores(Vec<GameHighScore>),
    ChatMembersCount(i64),
}

/// The result of [`Api::call`].
#[derive(Debug, Clone, PartialEq)]
pub enum GenericResult {
    Typed(TypedObject),
    Untyped(UnknownObject),
}

impl GenericResult {
    pub fn typed(&self) -> Option<&TypedObject> {
        match self {
            Self::Typed(object) => Some(object),
            Self::Untyped(_) => None,
        }
    }

    pub fn into_untyped(self) -> Option<UnknownObject> {
        match self {
            Self::Typed(_) => None,
            Self::Untyped(object) => Some(object),
        }
    }
}

type TableDecoder = fn(&ApiResponse) -> ApiResult<TypedObject>;

macro_rules! getter_table {
    ($($suffix:ident => $ty:ty),* $(,)?) => {
        static GETTERS: &[(&str, TableDecoder)] = &[$(
            (stringify!($suffix), {
                fn decode(response: &ApiResponse) -> ApiResult<TypedObject> {
                    response.decode_result::<$ty>().map(TypedObject::$suffix)
                }
                decode as TableDecoder
            }),
        )*];
    };
}

getter_table! {
    Me => User,
    Chat => Chat,
    File => File,
    ChatMember => ChatMember,
    ChatAdministrators => Vec<ChatMember>,
    UserProfilePhotos => UserProfilePhotos,
    WebhookInfo => WebhookInfo,
    Updates => Vec<Update>,
    GameHighScores => Vec<GameHighScore>,
    ChatMembersCount => i64,
}

/// Looks up the decoder for a getter method name such as `getChat`.
fn getter_decoder(method: &str) -> Option<TableDecoder> {
    let suffix = method.strip_prefix(GETTER_PREFIX)?;
    GETTERS
        .iter()
        .find(|(name, _)| *name == suffix)
        .map(|(_, decode)| *decode)
}

fn decode_untyped(response: &ApiResponse) -> ApiResult<GenericResult> {
    Ok(GenericResult::Untyped(UnknownObject(response.result().clone())))
}

impl Api {
    /// Calls a Bot API method by name.
    ///
    /// `method` is the method's wire name (`getChat`, `setMyCommands`, ...).
    /// Uploads are not supported here; use the typed methods for those.
    pub async fn call(&self, method: &str, params: Params) -> ApiResult<Outcome<GenericResult>> {
        match getter_decoder(method) {
            Some(decode) => {
                trace!(method, "Dispatching typed getter");
                self.invoke(method, params, &[], move |response: &ApiResponse| {
                    decode(response).map(GenericResult::Typed)
                })
                .await
            }
            None => self.invoke(method, params, &[], decode_untyped).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tgbot_core::params;

    use crate::testing::RecordingTransport;

    fn api(transport: &std::sync::Arc<RecordingTransport>) -> Api {
        Api::builder()
            .token("123:abc")
            .transport(transport.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn test_getter_lookup() {
        assert!(getter_decoder("getMe").is_some());
        assert!(getter_decoder("getChatMembersCount").is_some());
        assert!(getter_decoder("getStickerSet").is_none());
        assert!(getter_decoder("sendMessage").is_none());
        assert!(getter_decoder("Me").is_none());
    }

    #[tokio::test]
    async fn test_known_getter_is_typed() {
        let transport = RecordingTransport::new();
        transport.respond_ok(json!({"id": -100, "type": "supergroup", "title": "Rust"}));
        transport.respond_ok(json!(12));
        let api = api(&transport);

        let chat = api
            .call("getChat", params! { "chat_id" => -100 })
            .await
            .unwrap()
            .resolve()
            .await
            .unwrap();
        let Some(TypedObject::Chat(chat)) = chat.typed() else {
            panic!("expected a chat, got {chat:?}");
        };
        assert_eq!(chat.title.as_deref(), Some("Rust"));

        let count = api
            .call("getChatMembersCount", params! { "chat_id" => -100 })
            .await
            .unwrap()
            .into_ready()
            .unwrap();
        assert_eq!(count, GenericResult::Typed(TypedObject::ChatMembersCount(12)));
        assert_eq!(transport.last_request().unwrap().endpoint(), "getChatMembersCount");
    }

    #[tokio::test]
    async fn test_unknown_getter_and_other_methods_are_untyped() {
        let transport = RecordingTransport::new();
        transport.respond_ok(json!({"name": "pack", "stickers": []}));
        let api = api(&transport);

        let set = api
            .call("getStickerSet", params! { "name" => "pack" })
            .await
            .unwrap()
            .into_ready()
            .unwrap()
            .into_untyped()
            .unwrap();
        assert_eq!(set.get("name"), Some(&json!("pack")));

        let pinned = api
            .call("pinChatMessage", params! { "chat_id" => 1, "message_id" => 2 })
            .await
            .unwrap()
            .into_ready()
            .unwrap();
        assert_eq!(pinned, GenericResult::Untyped(UnknownObject(json!(true))));
    }

    #[tokio::test]
    async fn test_typed_getter_with_mismatched_result_fails() {
        let transport = RecordingTransport::new();
        transport.respond_ok(json!("not a user"));
        let api = api(&transport);
        assert!(api.call("getMe", Params::new()).await.is_err());
    }
}
