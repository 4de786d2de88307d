//! Echo Bot Example
//!
//! A small bot built on tgbot. It receives updates by long polling (or by
//! webhook when `webhook.enabled` is set) and answers a handful of commands.
//!
//! Replies are sent in async mode: each update's replies are submitted
//! without waiting and collected together before the next batch.
//!
//! # Usage
//!
//! ```bash
//! TELEGRAM_BOT_TOKEN=123:abc cargo run --package echo-bot
//! ```
//!
//! Settings are read from `tgbot.toml` and `TGBOT_*` environment variables,
//! e.g. `TGBOT_LOGGING__LEVEL=debug`.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tgbot::keyboard::InlineKeyboardButton;
use tgbot::objects::{CallbackQuery, Message};
use tgbot::prelude::*;
use tgbot::RequestDescriptor;
use tracing::{error, info, warn};

/// Long-polling timeout passed to `getUpdates`, in seconds.
const POLL_TIMEOUT: i64 = 30;

const HELP_TEXT: &str = "\
Echo Bot - Commands
/echo <text> - Echo text
/ping        - Pong!
/info        - Message info
/keyboard    - Inline keyboard demo
/help        - This help";

// ============================================================================
// Handlers
// ============================================================================

async fn handle_message(api: &Api, msg: &Message) -> ApiResult<()> {
    let Some(text) = msg.text_or_caption() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let sender = msg
        .from
        .as_ref()
        .map(|u| u.first_name.as_str())
        .unwrap_or("Unknown");
    info!(chat_id, sender, text, "Message received");

    if let Some(content) = text.strip_prefix("/echo ") {
        api.send_message(chat_id, content, params! { "reply_to_message_id" => msg.message_id })
            .await?;
        return Ok(());
    }

    match text.trim() {
        "/ping" => {
            api.send_chat_action(chat_id, "typing").await?;
            api.send_message(chat_id, "Pong!", Params::new()).await?;
        }
        "/help" | "/start" => {
            api.send_message(chat_id, HELP_TEXT, Params::new()).await?;
        }
        "/info" => {
            let info = format!(
                "Message Info\n\
                • Chat: {} ({})\n\
                • From: {}\n\
                • Message ID: {}",
                chat_id, msg.chat.kind, sender, msg.message_id
            );
            api.send_message(chat_id, &info, Params::new()).await?;
        }
        "/keyboard" => {
            let markup = ReplyMarkup::inline([[
                InlineKeyboardButton::callback("Left", "left"),
                InlineKeyboardButton::callback("Right", "right"),
            ]]);
            api.send_message(chat_id, "Pick a side", params! { "reply_markup" => markup })
                .await?;
        }
        _ if msg.is_command() => {
            api.send_message(chat_id, "Unknown command, try /help", Params::new())
                .await?;
        }
        _ => {}
    }
    Ok(())
}

async fn handle_callback(api: &Api, query: &CallbackQuery) -> ApiResult<()> {
    let choice = query.data.as_deref().unwrap_or("nothing");
    api.answer_callback_query(&query.id, params! { "text" => format!("You picked {choice}") })
        .await?;
    if let Some(msg) = &query.message {
        api.edit_message_text(
            &format!("Picked: {choice}"),
            params! { "chat_id" => msg.chat.id, "message_id" => msg.message_id },
        )
        .await?;
    }
    Ok(())
}

async fn handle_update(api: &Api, update: &Update) {
    let result = api
        .scoped(async |api: &Api| match update.kind() {
            UpdateKind::Message | UpdateKind::EditedMessage => match update.any_message() {
                Some(msg) => handle_message(api, msg).await,
                None => Ok(()),
            },
            UpdateKind::CallbackQuery => match &update.callback_query {
                Some(query) => handle_callback(api, query).await,
                None => Ok(()),
            },
            kind => {
                info!(update_id = update.update_id, ?kind, "Ignoring update");
                Ok(())
            }
        })
        .await;
    if let Err(e) = result {
        error!(update_id = update.update_id, error = %e, "Failed to handle update");
    }
}

// ============================================================================
// Update sources
// ============================================================================

async fn poll(api: &Api) -> Result<()> {
    let mut offset = 0_i64;
    loop {
        // Polling always waits for its result, regardless of async mode.
        let updates = api
            .get_updates(params! { "offset" => offset, "timeout" => POLL_TIMEOUT })
            .await?
            .resolve()
            .await;
        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "getUpdates failed, retrying");
                tokio::time::sleep(Duration::from_secs(3)).await;
                continue;
            }
        };
        api.async_wait().await;
        for update in &updates {
            offset = offset.max(update.update_id + 1);
            handle_update(api, update).await;
        }
    }
}

async fn serve_webhook(api: &Api, config: &TgbotConfig) -> Result<()> {
    let (handle, mut updates) = listen_webhook(&config.webhook).await?;
    if let Some(url) = &config.webhook.public_url {
        api.set_webhook(url, None, Params::new()).await?.resolve().await?;
        info!(url = %url, "Webhook registered");
    }

    loop {
        tokio::select! {
            Some(update) = updates.recv() => handle_update(api, &update).await,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.stop();
    api.remove_webhook().await?.resolve().await?;
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    init_logging(&config.logging);

    let api = Api::builder()
        .token(config.api.resolve_token()?)
        .base_url(&config.api.base_url)
        .timeout(config.api.timeout())
        .async_requests(true)
        .on_rejected(Arc::new(
            |request: &RequestDescriptor, e: &ApiError, elapsed: Duration| {
                warn!(endpoint = request.endpoint(), error = %e, ?elapsed, "Request failed");
            },
        ))
        .build()?;

    let me = api.get_me().await?.resolve().await?;
    info!(
        id = me.id,
        username = me.username.as_deref().unwrap_or_default(),
        "Bot started"
    );

    if config.webhook.enabled {
        serve_webhook(&api, &config).await?;
    } else {
        poll(&api).await?;
    }

    api.close().await;
    Ok(())
}
