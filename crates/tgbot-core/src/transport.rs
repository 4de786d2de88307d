//! The transport seam.
//!
//! The orchestrator never talks HTTP itself. It hands each
//! [`RequestDescriptor`] to a [`Transport`] and observes the outcome; how the
//! bytes travel (and whether anything is retried) is entirely the
//! transport's concern.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportResult;
use crate::request::RequestDescriptor;

/// The raw result of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl RawResponse {
    /// Creates a response from a status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers requests to the Bot API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns the server's response.
    ///
    /// A response with an error status is still `Ok`; only failures to
    /// complete the exchange are errors.
    async fn send(&self, request: Arc<RequestDescriptor>) -> TransportResult<RawResponse>;

    /// Short name used in log output.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Shared transport handle.
pub type BoxedTransport = Arc<dyn Transport>;
