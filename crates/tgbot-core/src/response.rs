//! Decoded responses and the response future.
//!
//! Every dispatched request is represented by a [`ResponseFuture`]. The
//! request itself runs on a spawned task, so submission never blocks; the
//! future settles exactly once (to an [`ApiResponse`] or an [`ApiError`]) and
//! every later [`wait`](ResponseFuture::wait) returns the cached outcome.
//!
//! ```text
//!            ┌──────────► Resolved(ApiResponse)
//! Pending ───┤
//!            └──────────► Failed(ApiError)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ApiError, ApiResult, TransportError, TransportResult};
use crate::hooks::FulfillmentHooks;
use crate::request::RequestDescriptor;
use crate::transport::{BoxedTransport, RawResponse};

/// Upper bound on how much of a non-JSON error body is kept in the error.
const MAX_ERROR_BODY: usize = 256;

// =============================================================================
// ApiResponse
// =============================================================================

/// A successful Bot API response.
#[derive(Clone)]
pub struct ApiResponse {
    request: Arc<RequestDescriptor>,
    status: u16,
    body: Arc<Value>,
}

impl ApiResponse {
    /// Classifies the outcome of a transport exchange.
    ///
    /// The exchange is successful only if the status is 2xx and the body is a
    /// JSON envelope whose `ok` field is `true`.
    pub fn classify(
        request: Arc<RequestDescriptor>,
        raw: TransportResult<RawResponse>,
    ) -> ApiResult<Self> {
        let raw = raw?;
        let body: Value = match serde_json::from_slice(&raw.body) {
            Ok(body) => body,
            Err(e) if raw.is_success() => return Err(e.into()),
            Err(_) => {
                let text = String::from_utf8_lossy(&raw.body);
                return Err(ApiError::Remote {
                    status: raw.status,
                    error_code: None,
                    description: truncate(&text, MAX_ERROR_BODY),
                    retry_after: None,
                    migrate_to_chat_id: None,
                });
            }
        };

        let ok = body.get("ok").and_then(Value::as_bool).unwrap_or(false);
        if !raw.is_success() || !ok {
            let parameters = body.get("parameters");
            return Err(ApiError::Remote {
                status: raw.status,
                error_code: body.get("error_code").and_then(Value::as_i64),
                description: body
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error")
                    .to_string(),
                retry_after: parameters
                    .and_then(|p| p.get("retry_after"))
                    .and_then(Value::as_i64),
                migrate_to_chat_id: parameters
                    .and_then(|p| p.get("migrate_to_chat_id"))
                    .and_then(Value::as_i64),
            });
        }

        Ok(Self {
            request,
            status: raw.status,
            body: Arc::new(body),
        })
    }

    /// The request this response answers.
    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The full decoded envelope.
    pub fn decoded_body(&self) -> &Value {
        &self.body
    }

    /// The `result` field of the envelope (`Null` if absent).
    pub fn result(&self) -> &Value {
        self.body.get("result").unwrap_or(&Value::Null)
    }

    /// The envelope's `description`, which some methods set on success
    /// (`setWebhook` answers "Webhook was set").
    pub fn description(&self) -> Option<&str> {
        self.body.get("description").and_then(Value::as_str)
    }

    /// Deserializes the `result` field.
    pub fn decode_result<T: DeserializeOwned>(&self) -> ApiResult<T> {
        Ok(T::deserialize(self.result())?)
    }
}

impl fmt::Debug for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResponse")
            .field("endpoint", &self.request.endpoint())
            .field("status", &self.status)
            .field("body", &self.body)
            .finish()
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

// =============================================================================
// ResponseFuture
// =============================================================================

type Settlement = ApiResult<ApiResponse>;

/// Handle to an in-flight or completed API call.
///
/// Cloning is cheap; all clones observe the same single outcome.
#[derive(Clone)]
pub struct ResponseFuture {
    request: Arc<RequestDescriptor>,
    inner: Shared<BoxFuture<'static, Settlement>>,
}

impl ResponseFuture {
    /// Submits `request` on a background task and returns its handle.
    ///
    /// When the exchange completes, the task measures the elapsed time and
    /// fires exactly one of the callbacks in `hooks`. The hooks are the
    /// snapshot passed here; later changes to the caller's hooks do not
    /// reach this request.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(
        transport: BoxedTransport,
        request: Arc<RequestDescriptor>,
        hooks: FulfillmentHooks,
    ) -> Self {
        let task_request = Arc::clone(&request);
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            debug!(
                endpoint = %task_request.endpoint(),
                transport = transport.name(),
                multipart = task_request.is_multipart(),
                "Sending Bot API request"
            );
            let raw = transport.send(Arc::clone(&task_request)).await;
            let outcome = ApiResponse::classify(Arc::clone(&task_request), raw);
            let elapsed = started.elapsed();
            trace!(
                endpoint = %task_request.endpoint(),
                elapsed_ms = elapsed.as_millis() as u64,
                ok = outcome.is_ok(),
                "Bot API request settled"
            );
            hooks.notify(&task_request, &outcome, elapsed);
            outcome
        });

        let inner = async move {
            handle.await.unwrap_or_else(|e| {
                Err(ApiError::Transport(TransportError::Aborted(e.to_string())))
            })
        }
        .boxed()
        .shared();

        Self { request, inner }
    }

    /// Creates a future that is already settled.
    pub fn settled(request: Arc<RequestDescriptor>, outcome: Settlement) -> Self {
        let inner = futures::future::ready(outcome).boxed().shared();
        Self { request, inner }
    }

    /// The request this future belongs to.
    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    /// Waits until the request settles and returns its outcome.
    ///
    /// Idempotent: once settled, every call returns a clone of the same
    /// outcome without touching the transport again.
    pub async fn wait(&self) -> Settlement {
        self.inner.clone().await
    }

    /// Returns the outcome if the request has already settled.
    pub fn try_outcome(&self) -> Option<Settlement> {
        if let Some(outcome) = self.inner.peek() {
            return Some(outcome.clone());
        }
        self.inner.clone().now_or_never()
    }

    /// Returns `true` once the request has settled.
    pub fn is_settled(&self) -> bool {
        self.try_outcome().is_some()
    }

    /// Waits and returns `true` if the request failed.
    pub async fn is_error(&self) -> bool {
        self.wait().await.is_err()
    }

    /// Waits and returns the decoded envelope, or the request's error.
    pub async fn decoded_body(&self) -> ApiResult<Arc<Value>> {
        self.wait().await.map(|response| Arc::clone(&response.body))
    }
}

impl fmt::Debug for ResponseFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseFuture")
            .field("endpoint", &self.request.endpoint())
            .field("settled", &self.inner.peek().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use crate::request::RequestBody;
    use crate::transport::Transport;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct ScriptedTransport {
        calls: AtomicUsize,
        reply: TransportResult<RawResponse>,
    }

    impl ScriptedTransport {
        fn new(reply: TransportResult<RawResponse>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply,
            })
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, _request: Arc<RequestDescriptor>) -> TransportResult<RawResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    fn request(endpoint: &str) -> Arc<RequestDescriptor> {
        Arc::new(RequestDescriptor::new(
            "123:abc",
            endpoint,
            RequestBody::form(Params::new()),
            Duration::from_secs(60),
            Duration::from_secs(10),
            false,
        ))
    }

    fn ok(body: &str) -> TransportResult<RawResponse> {
        Ok(RawResponse::new(200, body.to_string()))
    }

    #[test]
    fn test_classify_success() {
        let response =
            ApiResponse::classify(request("getMe"), ok(r#"{"ok":true,"result":{"id":1}}"#)).unwrap();
        assert_eq!(response.result()["id"], 1);
        assert_eq!(response.status(), 200);
        assert_eq!(response.description(), None);

        let response = ApiResponse::classify(
            request("setWebhook"),
            ok(r#"{"ok":true,"result":true,"description":"Webhook was set"}"#),
        )
        .unwrap();
        assert_eq!(response.description(), Some("Webhook was set"));
    }

    #[test]
    fn test_classify_error_envelope() {
        let raw = Ok(RawResponse::new(
            429,
            r#"{"ok":false,"error_code":429,"description":"Too Many Requests","parameters":{"retry_after":3}}"#,
        ));
        match ApiResponse::classify(request("sendMessage"), raw) {
            Err(ApiError::Remote {
                status,
                error_code,
                description,
                retry_after,
                ..
            }) => {
                assert_eq!(status, 429);
                assert_eq!(error_code, Some(429));
                assert_eq!(description, "Too Many Requests");
                assert_eq!(retry_after, Some(3));
            }
            other => panic!("Expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_ok_false_with_success_status() {
        let raw = ok(r#"{"ok":false,"description":"Bad Request: chat not found"}"#);
        let err = ApiResponse::classify(request("getChat"), raw).unwrap_err();
        assert!(matches!(err, ApiError::Remote { status: 200, .. }));
    }

    #[test]
    fn test_classify_non_json_error_page() {
        let raw = Ok(RawResponse::new(502, "<html>Bad Gateway</html>"));
        let err = ApiResponse::classify(request("getMe"), raw).unwrap_err();
        assert!(matches!(err, ApiError::Remote { status: 502, .. }));

        let err = ApiResponse::classify(request("getMe"), ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn test_classify_transport_failure() {
        let raw = Err(TransportError::Http("connection reset".into()));
        let err = ApiResponse::classify(request("getMe"), raw).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn test_wait_is_idempotent() {
        let transport = ScriptedTransport::new(ok(r#"{"ok":true,"result":true}"#));
        let future = ResponseFuture::dispatch(
            transport.clone(),
            request("deleteWebhook"),
            FulfillmentHooks::new(),
        );

        let first = future.wait().await.unwrap();
        let second = future.wait().await.unwrap();
        assert!(Arc::ptr_eq(&first.body, &second.body));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert!(future.is_settled());
    }

    #[tokio::test]
    async fn test_failed_future_surfaces_error_on_body_access() {
        let transport = ScriptedTransport::new(Err(TransportError::Http("refused".into())));
        let future =
            ResponseFuture::dispatch(transport, request("getMe"), FulfillmentHooks::new());

        assert!(future.is_error().await);
        assert!(matches!(
            future.decoded_body().await,
            Err(ApiError::Transport(TransportError::Http(_)))
        ));
    }

    #[tokio::test]
    async fn test_hooks_fire_once_per_branch() {
        let fulfilled = Arc::new(AtomicUsize::new(0));
        let rejected = Arc::new(AtomicUsize::new(0));
        let mut hooks = FulfillmentHooks::new();
        let f = Arc::clone(&fulfilled);
        hooks.set_on_fulfilled(Some(Arc::new(move |_: &ApiResponse, _: Duration| {
            f.fetch_add(1, Ordering::SeqCst);
        })));
        let r = Arc::clone(&rejected);
        hooks.set_on_rejected(Some(Arc::new(
            move |_: &RequestDescriptor, _: &ApiError, _: Duration| {
                r.fetch_add(1, Ordering::SeqCst);
            },
        )));

        let good = ScriptedTransport::new(ok(r#"{"ok":true,"result":1}"#));
        let bad = ScriptedTransport::new(ok(r#"{"ok":false,"description":"nope"}"#));
        let a = ResponseFuture::dispatch(good, request("a"), hooks.clone());
        let b = ResponseFuture::dispatch(bad, request("b"), hooks);

        a.wait().await.unwrap();
        a.wait().await.unwrap();
        b.wait().await.unwrap_err();

        assert_eq!(fulfilled.load(Ordering::SeqCst), 1);
        assert_eq!(rejected.load(Ordering::SeqCst), 1);
    }

    struct HeldTransport(tokio::sync::Semaphore);

    #[async_trait]
    impl Transport for HeldTransport {
        async fn send(&self, _request: Arc<RequestDescriptor>) -> TransportResult<RawResponse> {
            self.0
                .acquire()
                .await
                .map_err(|e| TransportError::Aborted(e.to_string()))?
                .forget();
            ok(r#"{"ok":true,"result":true}"#)
        }
    }

    #[tokio::test]
    async fn test_wait_pends_until_transport_replies() {
        let transport = Arc::new(HeldTransport(tokio::sync::Semaphore::new(0)));
        let future = ResponseFuture::dispatch(
            transport.clone(),
            request("getMe"),
            FulfillmentHooks::new(),
        );

        let mut waiting = tokio_test::task::spawn(future.wait());
        tokio_test::assert_pending!(waiting.poll());
        assert!(!future.is_settled());
        drop(waiting);

        transport.0.add_permits(1);
        assert!(future.wait().await.is_ok());
        assert!(future.is_settled());
    }

    #[tokio::test]
    async fn test_settled_future() {
        let future = ResponseFuture::settled(request("x"), Err(ApiError::Serialization("x".into())));
        assert!(future.is_settled());
        assert!(future.wait().await.is_err());
    }
}
