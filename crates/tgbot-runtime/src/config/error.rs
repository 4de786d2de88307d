//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded or accepted.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// A source could not be read, or the merged result does not fit the schema.
    #[error("malformed configuration: {0}")]
    Parse(String),

    /// A value is present but out of range.
    #[error("{key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// A value required by another setting is absent.
    #[error("{0} is required by the current settings")]
    MissingField(&'static str),

    /// A URL setting does not parse or uses the wrong scheme.
    #[error("{key} = {url:?} is not a usable URL: {reason}")]
    InvalidUrl {
        key: &'static str,
        url: String,
        reason: String,
    },

    /// Neither `api.token` nor the token environment variable is set.
    #[error(
        "Required \"token\" not supplied in config and could not find fallback environment variable \"{env}\""
    )]
    MissingToken { env: &'static str },
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }

    pub fn invalid_url(key: &'static str, url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            key,
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
