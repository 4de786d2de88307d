//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config`: enables TOML configuration files (`tgbot.toml`, `config.toml`)
//! - `yaml-config`: enables YAML configuration files (`tgbot.yaml`, `tgbot.yml`, etc.)
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic values ([`ConfigLoader::merge`])
//! 3. Profile-specific config file (`tgbot.{profile}.toml`)
//! 4. Main config file (`tgbot.toml`)
//! 5. Environment variables (`TGBOT_*`)
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `TGBOT_` prefix with `__` as separator:
//!
//! - `TGBOT_API__TOKEN=123:abc` → `api.token = "123:abc"`
//! - `TGBOT_API__TIMEOUT_SECS=30` → `api.timeout_secs = 30`
//! - `TGBOT_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//!
//! When no token ends up configured, [`ApiConfig::resolve_token`] still
//! consults `TELEGRAM_BOT_TOKEN`.
//!
//! [`ApiConfig::resolve_token`]: super::schema::ApiConfig::resolve_token
//!
//! # Example
//!
//! ```rust,ignore
//! use tgbot_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./deploy/tgbot.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::TgbotConfig;

/// Environment variable selecting the profile.
pub const PROFILE_ENV: &str = "TGBOT_PROFILE";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            _ => Self::Custom(name.to_string()),
        }
    }

    /// Reads `TGBOT_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a file extension is merged into the figment.
type FileMerger = fn(Figment, &Path) -> Figment;

/// File names looked up in each search directory, with their merger.
///
/// Order matters: the first base file found wins.
const CANDIDATES: &[(&str, FileMerger)] = &[
    #[cfg(feature = "toml-config")]
    ("tgbot.toml", merge_toml),
    #[cfg(feature = "toml-config")]
    ("config.toml", merge_toml),
    #[cfg(feature = "yaml-config")]
    ("tgbot.yaml", merge_yaml),
    #[cfg(feature = "yaml-config")]
    ("tgbot.yml", merge_yaml),
    #[cfg(feature = "yaml-config")]
    ("config.yaml", merge_yaml),
    #[cfg(feature = "yaml-config")]
    ("config.yml", merge_yaml),
];

#[cfg(feature = "toml-config")]
fn merge_toml(figment: Figment, path: &Path) -> Figment {
    figment.merge(Toml::file(path))
}

#[cfg(feature = "yaml-config")]
fn merge_yaml(figment: Figment, path: &Path) -> Figment {
    figment.merge(Yaml::file(path))
}

/// Builds a [`TgbotConfig`] from defaults, files and the environment.
pub struct ConfigLoader {
    overrides: Option<TgbotConfig>,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    explicit_file: Option<PathBuf>,
    read_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Starts from the built-in defaults and the profile in `TGBOT_PROFILE`.
    pub fn new() -> Self {
        Self {
            overrides: None,
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            explicit_file: None,
            read_env: true,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Looks for config files in `dir` instead of the default locations.
    ///
    /// May be called several times; directories are searched in order.
    pub fn search_path<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.search_paths.push(dir.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file, skipping the search. It must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.explicit_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.read_env = true;
        self
    }

    /// Ignores `TGBOT_*` variables.
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Replaces the built-in defaults with `config`.
    ///
    /// Files and the environment still override these values.
    pub fn merge(mut self, config: TgbotConfig) -> Self {
        self.overrides = Some(config);
        self
    }

    /// Merges every source and extracts the result.
    pub fn load(self) -> ConfigResult<TgbotConfig> {
        let figment = self.figment()?;
        let config: TgbotConfig = figment
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        debug!(
            profile = %self.profile,
            base_url = %config.api.base_url,
            timeout_secs = config.api.timeout_secs,
            async_requests = config.api.async_requests,
            webhook = config.webhook.enabled,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(TgbotConfig::default()));
        if let Some(overrides) = &self.overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        figment = match &self.explicit_file {
            Some(path) => Self::merge_explicit(figment, path)?,
            None => self.merge_search(figment),
        };

        if self.read_env {
            trace!("Reading TGBOT_* environment overrides");
            figment = figment.merge(Env::prefixed("TGBOT_").ignore(&["PROFILE"]).split("__"));
        }
        Ok(figment)
    }

    fn merge_explicit(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let merger = CANDIDATES
            .iter()
            .find(|(name, _)| name.rsplit_once('.').is_some_and(|(_, e)| e == ext))
            .map(|(_, merger)| *merger)
            .ok_or_else(|| {
                ConfigError::Parse(format!("no enabled format reads .{ext} files"))
            })?;
        info!(path = %path.display(), "Loading configuration file");
        Ok(merger(figment, path))
    }

    /// Searches each directory for the candidate names. A profile variant
    /// (`tgbot.{profile}.toml`) is merged beneath its base file; the first
    /// base file found ends the search.
    fn merge_search(&self, mut figment: Figment) -> Figment {
        let dirs = self.directories();
        for dir in &dirs {
            for (name, merger) in CANDIDATES {
                let Some((stem, ext)) = name.rsplit_once('.') else {
                    continue;
                };
                let variant = dir.join(format!("{stem}.{}.{ext}", self.profile));
                if variant.is_file() {
                    debug!(path = %variant.display(), "Loading profile configuration");
                    figment = merger(figment, &variant);
                }
                let base = dir.join(name);
                if base.is_file() {
                    info!(path = %base.display(), "Loading configuration file");
                    return merger(figment, &base);
                }
            }
        }
        warn!(search_paths = ?dirs, "No configuration file found, using defaults");
        figment
    }

    /// The explicit search paths, or the working directory and the user
    /// config directory.
    fn directories(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|d| d.join("tgbot")))
            .collect()
    }
}

/// Loads configuration from the default locations and environment.
pub fn load_config() -> ConfigResult<TgbotConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path`, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<TgbotConfig> {
    ConfigLoader::new().file(path).load()
}
