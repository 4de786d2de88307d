//! # tgbot Transport
//!
//! Network transport implementations for the tgbot Telegram Bot API client.
//!
//! This crate provides concrete implementations of the [`Transport`] seam
//! defined in `tgbot-core`, plus the inbound webhook receiver. Each is
//! behind a feature flag.
//!
//! ## Features
//!
//! - `http-client` (default): [`HttpTransport`], a reqwest-based Bot API client
//! - `http-server`: [`http::server::listen`], an axum-based webhook receiver
//! - `full`: both
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tgbot_transport::HttpTransport;
//!
//! // Talk to a local Bot API server instead of api.telegram.org
//! let transport = Arc::new(HttpTransport::with_base_url("http://127.0.0.1:8081"));
//! ```
//!
//! ```rust,ignore
//! use tgbot_transport::http::server::listen;
//!
//! let (handle, mut updates) = listen::<serde_json::Value>("0.0.0.0:8443", "/hook").await?;
//! while let Some(update) = updates.recv().await {
//!     println!("update: {update}");
//! }
//! ```
//!
//! [`Transport`]: tgbot_core::Transport

#[cfg(any(feature = "http-client", feature = "http-server"))]
pub mod http;

#[cfg(feature = "http-client")]
pub use http::{DEFAULT_BASE_URL, HttpTransport, file_url};

#[cfg(feature = "http-server")]
pub use http::{WebhookHandle, listen, parse_update};
