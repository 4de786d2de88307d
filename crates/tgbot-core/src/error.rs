//! Unified error types for the tgbot request lifecycle.
//!
//! Errors fall into three families, distinguished by *when* they surface:
//!
//! | Family | Raised | Reaches the caller |
//! |--------|--------|--------------------|
//! | [`ApiError::Config`] | while constructing the client | immediately |
//! | [`ValidationError`] | before a request leaves the process | immediately, in every mode |
//! | [`TransportError`] / [`ApiError::Remote`] | when a response future is waited on | only at a wait boundary |

use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors produced by a [`Transport`](crate::Transport) while delivering a request.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The connection to the API server could not be established.
    #[error("connection failed: {url} - {reason}")]
    ConnectionFailed {
        /// The URL that failed to connect.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// The request did not complete within its timeout.
    #[error("request to '{endpoint}' timed out")]
    Timeout {
        /// The endpoint being called.
        endpoint: String,
    },

    /// The HTTP exchange failed below the application layer.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A multipart attachment could not be prepared.
    #[error("failed to prepare attachment '{name}': {reason}")]
    Attachment {
        /// The multipart field name.
        name: String,
        /// Reason for failure.
        reason: String,
    },

    /// An inbound payload could not be decoded.
    #[error("failed to decode payload: {0}")]
    Decode(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// The spawned request task ended without producing a response.
    #[error("request task aborted: {0}")]
    Aborted(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors detected before any network dispatch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The value is not a well-formed absolute URL.
    #[error("invalid URL provided: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },

    /// The URL is well-formed but does not use HTTPS.
    #[error("invalid URL, should be a HTTPS url: {url}")]
    InsecureUrl {
        /// The offending URL.
        url: String,
    },

    /// An enumerated parameter carries a value outside its accepted set.
    #[error("invalid {param} '{value}'! Accepted values: {}", .accepted.join(", "))]
    UnsupportedValue {
        /// Parameter name.
        param: String,
        /// The rejected value.
        value: String,
        /// Every value the endpoint accepts.
        accepted: Vec<String>,
    },

    /// An uploaded file has the wrong format for its slot.
    #[error("invalid {param} provided. Supported format: {expected}")]
    InvalidFileFormat {
        /// Parameter name.
        param: String,
        /// The required format.
        expected: String,
    },

    /// A required parameter is absent or `Null`.
    #[error("missing required parameter '{0}'")]
    MissingParam(String),

    /// A local file exists but could not be read.
    #[error("unable to open '{path}': {reason}")]
    UnreadableFile {
        /// The file path.
        path: String,
        /// Reason for failure.
        reason: String,
    },
}

impl ValidationError {
    /// Creates an unsupported-value error from any list of accepted values.
    pub fn unsupported<I, S>(param: impl Into<String>, value: impl Into<String>, accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::UnsupportedValue {
            param: param.into(),
            value: value.into(),
            accepted: accepted.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Error type for API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The client is misconfigured (for example, no bot token).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request was rejected before dispatch.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request could not be delivered.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API answered with an error envelope or an error status.
    #[error("API error ({status}): {description}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// The `error_code` field of the envelope, if present.
        error_code: Option<i64>,
        /// The `description` field of the envelope.
        description: String,
        /// Seconds to wait before retrying, when the server asked for it.
        retry_after: Option<i64>,
        /// The supergroup a group chat migrated to, when reported.
        migrate_to_chat_id: Option<i64>,
    },

    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns `true` for errors that a best-effort drain may discard.
    ///
    /// Only failures observed while waiting on a response qualify; configuration
    /// and validation errors are never swallowed.
    pub fn is_suppressible_in_drain(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Remote { .. } | Self::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
