//! HTTP transport implementations.

#[cfg(feature = "http-client")]
pub mod client;

#[cfg(feature = "http-server")]
pub mod server;

#[cfg(feature = "http-client")]
pub use client::{DEFAULT_BASE_URL, HttpTransport, file_url};

#[cfg(feature = "http-server")]
pub use server::{WebhookHandle, listen, parse_update};
