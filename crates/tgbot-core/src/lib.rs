//! # tgbot-core
//!
//! Request lifecycle primitives for the tgbot Telegram Bot API client.
//!
//! This crate contains everything between "a method name and some
//! parameters" and "a settled response", without any network code:
//!
//! - [`Params`] / [`ParamValue`]: ordered, loosely typed method parameters
//! - [`InputFile`] / [`FileStream`]: file slots and their opened form
//! - [`RequestDescriptor`] / [`RequestBody`]: the immutable outbound call
//! - [`Transport`]: the seam network implementations plug into
//! - [`ResponseFuture`] / [`ApiResponse`]: one-shot settlement of a call
//! - [`FulfillmentHooks`]: per-request completion callbacks
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  tgbot              │  (Api orchestrator, typed methods)
//! ├─────────────────────┤
//! │  tgbot-core         │  <- This crate (descriptors, futures, hooks)
//! ├─────────────────────┤
//! │  tgbot-transport    │  (reqwest client, axum webhook receiver)
//! └─────────────────────┘
//! ```

pub mod error;
pub mod hooks;
pub mod input_file;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;

pub use error::{ApiError, ApiResult, TransportError, TransportResult, ValidationError};
pub use hooks::{FulfillmentHooks, OnFulfilled, OnRejected};
pub use input_file::{FileStream, InputFile, parse_absolute_url, prepare_upload};
pub use params::{ParamValue, Params};
pub use request::{MultipartField, PartContents, RequestBody, RequestDescriptor, SDK_VERSION};
pub use response::{ApiResponse, ResponseFuture};
pub use transport::{BoxedTransport, RawResponse, Transport};
