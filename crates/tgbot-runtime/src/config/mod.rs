//! Configuration for Telegram bot applications.
//!
//! Configuration is layered with figment: built-in defaults, config files,
//! then `TGBOT_*` environment variables. See [`loader`] for the details.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ApiConfig, BOT_TOKEN_ENV, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig,
    TgbotConfig, WebhookConfig,
};
pub use validation::validate_config;
