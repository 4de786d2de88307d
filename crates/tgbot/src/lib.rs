//! # tgbot
//!
//! An async Telegram Bot API client.
//!
//! ## Overview
//!
//! [`Api`] sends Bot API methods over a pluggable [`Transport`] and returns
//! an [`Outcome`] for each call. In the default sync mode the outcome is
//! the decoded result. In async mode calls return immediately with a
//! [`Deferred`] result and are collected later, either one by one or all at
//! once with [`Api::async_wait`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  Params   ┌──────────────────┐  send   ┌─────────────────┐
//! │   Api    │──────────▶│ RequestDescriptor │────────▶│    Transport    │
//! │ methods  │           └──────────────────┘         │ (HttpTransport) │
//! └──────────┘                                         └────────┬────────┘
//!      ▲            decode              ┌────────────────┐      │
//!      └────────────────────────────────│ ResponseFuture │◀─────┘
//!                                       │  (hooks fire)  │
//!                                       └────────────────┘
//! ```
//!
//! - **tgbot-core**: request descriptors, response futures, hooks, errors
//! - **tgbot-transport**: reqwest client and axum webhook receiver
//! - **tgbot-runtime**: configuration loading and logging setup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tgbot::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     init_logging(&config.logging);
//!
//!     let api = Api::from_config(&config)?;
//!     let me = api.get_me().await?.resolve().await?;
//!     info!(username = ?me.username, "Connected");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `http-client`: reqwest transport (default)
//! - `http-server`: webhook receiver ([`webhook::listen_webhook`])
//! - `toml-config` / `yaml-config`: configuration file formats
//! - `json-log`: JSON log output

pub mod api;
pub mod generic;
pub mod keyboard;
mod methods;
pub mod objects;
pub mod outcome;

#[cfg(feature = "http-server")]
pub mod webhook;

#[cfg(test)]
mod testing;

pub use api::{Api, ApiBuilder};
pub use generic::{GenericResult, TypedObject};
pub use keyboard::ReplyMarkup;
pub use methods::CHAT_ACTIONS;
pub use outcome::{Deferred, Outcome};

pub use tgbot_core::{
    ApiError, ApiResponse, ApiResult, BoxedTransport, InputFile, OnFulfilled, OnRejected,
    ParamValue, Params, RequestDescriptor, ResponseFuture, Transport, TransportError,
    ValidationError, params,
};

pub use tgbot_core as core;
pub use tgbot_runtime as runtime;
pub use tgbot_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tgbot::prelude::*;
/// ```
pub mod prelude {
    // Client
    pub use crate::api::Api;
    pub use crate::outcome::{Deferred, Outcome};

    // Parameters
    pub use crate::keyboard::{InlineKeyboardButton, KeyboardButton, ReplyMarkup};
    pub use tgbot_core::{InputFile, ParamValue, Params, params};

    // Results
    pub use crate::objects::{Chat, EditResult, Message, Update, UpdateKind, User};
    pub use tgbot_core::{ApiError, ApiResult};

    // Config and logging
    pub use tgbot_runtime::config::{TgbotConfig, load_config};
    pub use tgbot_runtime::logging::init_from_config as init_logging;
    pub use tgbot_runtime::prelude::*;

    #[cfg(feature = "http-server")]
    pub use crate::webhook::listen_webhook;
}
