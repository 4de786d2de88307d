//! Receiving updates by webhook.

use tokio::sync::mpsc;
use tracing::info;

use tgbot_core::{ApiError, ApiResult};
use tgbot_runtime::config::WebhookConfig;
use tgbot_transport::{WebhookHandle, listen};

use crate::objects::Update;

/// Starts the webhook receiver described by `config`.
///
/// Updates pushed by Telegram arrive on the returned channel. Register
/// `config.public_url` with [`Api::set_webhook`](crate::Api::set_webhook)
/// so Telegram knows where to send them.
pub async fn listen_webhook(
    config: &WebhookConfig,
) -> ApiResult<(WebhookHandle, mpsc::Receiver<Update>)> {
    if !config.enabled {
        return Err(ApiError::config("webhook receiver is disabled in configuration"));
    }
    let (handle, updates) = listen::<Update>(&config.bind_addr(), &config.path).await?;
    info!(
        addr = %handle.local_addr(),
        public_url = config.public_url.as_deref().unwrap_or("<unset>"),
        "Receiving updates by webhook"
    );
    Ok((handle, updates))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WebhookConfig {
        WebhookConfig {
            enabled: true,
            host: "127.0.0.1".into(),
            port: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_disabled_receiver_is_a_config_error() {
        let config = WebhookConfig::default();
        assert!(matches!(
            listen_webhook(&config).await,
            Err(ApiError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_listen_binds_configured_path() {
        let (handle, _updates) = listen_webhook(&config()).await.unwrap();
        assert_eq!(handle.path(), "/telegram/webhook");
        assert_ne!(handle.local_addr().port(), 0);
        handle.stop();
    }
}
