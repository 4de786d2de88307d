//! Sanity checks run on a loaded [`TgbotConfig`].

use url::Url;

use super::error::{ConfigError, ConfigResult};
use super::schema::{ApiConfig, LogOutput, LoggingConfig, TgbotConfig, WebhookConfig};

/// Checks a loaded configuration.
///
/// The token is not required here; it may still come from the environment
/// when the client is built.
pub fn validate_config(config: &TgbotConfig) -> ConfigResult<()> {
    check_api(&config.api)?;
    check_webhook(&config.webhook)?;
    check_logging(&config.logging)
}

fn check_api(api: &ApiConfig) -> ConfigResult<()> {
    check_url("api.base_url", &api.base_url, &["http", "https"])?;

    if api.timeout_secs == 0 {
        return Err(ConfigError::invalid("api.timeout_secs", "must be at least 1"));
    }
    if api.connect_timeout_secs == 0 {
        return Err(ConfigError::invalid("api.connect_timeout_secs", "must be at least 1"));
    }
    match &api.token {
        Some(token) if token.chars().any(char::is_whitespace) => {
            Err(ConfigError::invalid("api.token", "contains whitespace"))
        }
        _ => Ok(()),
    }
}

fn check_webhook(webhook: &WebhookConfig) -> ConfigResult<()> {
    // A disabled receiver keeps its defaults around unchecked.
    if !webhook.enabled {
        return Ok(());
    }
    if webhook.port == 0 {
        return Err(ConfigError::invalid("webhook.port", "must be non-zero"));
    }
    if !webhook.path.starts_with('/') {
        return Err(ConfigError::invalid("webhook.path", "must start with '/'"));
    }
    match &webhook.public_url {
        // Telegram only delivers to HTTPS endpoints.
        Some(url) => check_url("webhook.public_url", url, &["https"]),
        None => Ok(()),
    }
}

fn check_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::MissingField("logging.file_path"));
    }
    Ok(())
}

fn check_url(key: &'static str, url: &str, schemes: &[&str]) -> ConfigResult<()> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::invalid_url(key, url, e.to_string()))?;
    if schemes.contains(&parsed.scheme()) {
        Ok(())
    } else {
        Err(ConfigError::invalid_url(
            key,
            url,
            format!("expected scheme {}", schemes.join(" or ")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass() {
        assert!(validate_config(&TgbotConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_names_the_key() {
        let mut config = TgbotConfig::default();
        config.api.timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "api.timeout_secs", .. }));
        assert_eq!(err.to_string(), "api.timeout_secs: must be at least 1");
    }

    #[test]
    fn test_base_url_scheme() {
        let mut config = TgbotConfig::default();
        config.api.base_url = "ftp://api.telegram.org".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { key: "api.base_url", .. })
        ));

        config.api.base_url = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_webhook_requires_https() {
        let mut config = TgbotConfig::default();
        config.webhook.public_url = Some("http://example.com/hook".into());
        // Not checked while disabled.
        assert!(validate_config(&config).is_ok());

        config.webhook.enabled = true;
        assert!(validate_config(&config).is_err());

        config.webhook.public_url = Some("https://example.com/hook".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = TgbotConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField("logging.file_path"))
        ));
    }
}
