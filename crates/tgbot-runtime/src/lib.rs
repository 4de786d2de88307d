//! Application-side support for tgbot: configuration and logging.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `TgbotConfig`)
//! - Configuration validation (`validate_config`)
//! - Subscriber setup for the `tracing` events emitted by the client (`LoggingBuilder`)
//!
//! ```ignore
//! use tgbot_runtime::{config, logging};
//!
//! let config = config::load_config()?;
//! config::validate_config(&config)?;
//! logging::init_from_config(&config.logging);
//! ```

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigLoader, ConfigResult, TgbotConfig, validate_config};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by applications
pub use tracing;
pub use tracing_subscriber;

/// Commonly used logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
