//! Webhook receiver.
//!
//! Telegram pushes each update as a single JSON object in the body of a POST
//! request. The receiver decodes that object into the caller's update type
//! and forwards it on a channel. Authenticity is not checked here; that is
//! left to the deployment (TLS termination, secret paths, firewalls).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use tgbot_core::{TransportError, TransportResult};

/// Capacity of the update channel.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Handle to a running webhook receiver.
///
/// Dropping this handle stops the server.
#[derive(Debug)]
pub struct WebhookHandle {
    local_addr: SocketAddr,
    path: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl WebhookHandle {
    /// The address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The route updates are accepted on.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Stops the server.
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for WebhookHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Shared state for the webhook route.
struct ServerState<T> {
    updates: mpsc::Sender<T>,
}

/// Starts a webhook receiver on `addr`, accepting updates on `path`.
///
/// Returns the server handle and the stream of decoded updates. A body that
/// does not decode into `T` is answered with `400 Bad Request` and logged.
pub async fn listen<T>(
    addr: &str,
    path: &str,
) -> TransportResult<(WebhookHandle, mpsc::Receiver<T>)>
where
    T: DeserializeOwned + Send + 'static,
{
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
    let state = Arc::new(ServerState { updates: tx });
    let router = Router::new()
        .route(&path, post(webhook_handler::<T>))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    info!(addr = %local_addr, path = %path, "Webhook receiver listening");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = server.await {
            error!(error = %e, "Webhook receiver error");
        }
        info!("Webhook receiver stopped");
    });

    let handle = WebhookHandle {
        local_addr,
        path,
        shutdown_tx: Some(shutdown_tx),
    };
    Ok((handle, rx))
}

/// Decodes one pushed update.
///
/// Exposed for servers that already own an HTTP stack and only need the
/// decoding step.
pub fn parse_update<T: DeserializeOwned>(body: &[u8]) -> TransportResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| TransportError::Decode(format!("invalid update payload: {e}")))
}

async fn webhook_handler<T>(
    State(state): State<Arc<ServerState<T>>>,
    body: Bytes,
) -> StatusCode
where
    T: DeserializeOwned + Send + 'static,
{
    let update: T = match parse_update(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, len = body.len(), "Rejected webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    debug!(len = body.len(), "Received webhook update");

    if state.updates.send(update).await.is_err() {
        warn!("Webhook update dropped: receiver closed");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestUpdate {
        update_id: i64,
    }

    #[tokio::test]
    async fn test_receives_and_decodes_updates() {
        let (handle, mut rx) = listen::<TestUpdate>("127.0.0.1:0", "hook").await.unwrap();
        assert_eq!(handle.path(), "/hook");
        let url = format!("http://{}/hook", handle.local_addr());

        let client = reqwest::Client::new();
        let ok = client
            .post(&url)
            .body(r#"{"update_id": 7, "message": {}}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(ok.status().as_u16(), 200);
        assert_eq!(rx.recv().await.unwrap().update_id, 7);

        let bad = client.post(&url).body("not json").send().await.unwrap();
        assert_eq!(bad.status().as_u16(), 400);

        handle.stop();
    }

    #[test]
    fn test_malformed_payload_is_a_decode_error() {
        let err = parse_update::<TestUpdate>(b"{\"update_id\": \"seven\"}").unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
        assert!(err.to_string().contains("invalid update payload"));
    }
}
