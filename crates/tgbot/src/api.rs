//! The request orchestrator.
//!
//! [`Api`] turns a method name and its parameters into a dispatched request
//! and hands back an [`Outcome`]. It owns the bot token, the timeouts, the
//! async flag, the fulfillment hooks and the registry of pending responses.
//!
//! # Sync and async mode
//!
//! Both modes take the same path: the request is built, submitted on a
//! background task, and wrapped in a [`ResponseFuture`]. In sync mode the
//! call then waits and returns [`Outcome::Ready`]. In async mode the future
//! is recorded in the registry and the call returns [`Outcome::Deferred`]
//! right away.
//!
//! The registry is drained (every future awaited, failures logged and
//! dropped) by [`Api::async_wait`], by switching async mode off, by
//! [`Api::close`] and at the end of [`Api::scoped`].
//!
//! ```rust,ignore
//! let mut api = Api::builder().token("123:abc").async_requests(true).build()?;
//! let sent = api.send_message(42, "hello", Params::new()).await?;
//! // ... other work ...
//! let message = sent.resolve().await?;
//! api.close().await;
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use tgbot_core::{
    ApiError, ApiResponse, ApiResult, BoxedTransport, FulfillmentHooks, OnFulfilled, OnRejected,
    ParamValue, Params, RequestBody, RequestDescriptor, ResponseFuture, prepare_upload,
};
use tgbot_runtime::config::{BOT_TOKEN_ENV, TgbotConfig};
#[cfg(feature = "http-client")]
use tgbot_transport::DEFAULT_BASE_URL;

use crate::outcome::{Deferred, Outcome};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[cfg(not(feature = "http-client"))]
const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

// =============================================================================
// Api
// =============================================================================

/// A Telegram Bot API client.
pub struct Api {
    token: String,
    base_url: String,
    transport: BoxedTransport,
    timeout: Duration,
    connect_timeout: Duration,
    is_async: bool,
    hooks: FulfillmentHooks,
    pending: Mutex<Vec<ResponseFuture>>,
    last_response: Mutex<Option<ResponseFuture>>,
}

impl Api {
    /// Creates a client for `token` with default settings.
    pub fn new(token: impl Into<String>) -> ApiResult<Self> {
        Self::builder().token(token).build()
    }

    /// Creates a client whose token is read from `TELEGRAM_BOT_TOKEN`.
    pub fn from_env() -> ApiResult<Self> {
        Self::builder().build()
    }

    /// Creates a client from loaded configuration.
    pub fn from_config(config: &TgbotConfig) -> ApiResult<Self> {
        let token = config
            .api
            .resolve_token()
            .map_err(|e| ApiError::config(e.to_string()))?;
        Self::builder()
            .token(token)
            .base_url(&config.api.base_url)
            .timeout(config.api.timeout())
            .connect_timeout(config.api.connect_timeout())
            .async_requests(config.api.async_requests)
            .build()
    }

    pub fn builder() -> ApiBuilder {
        ApiBuilder::default()
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    pub fn access_token(&self) -> &str {
        &self.token
    }

    /// Replaces the bot token used by later requests.
    pub fn set_access_token(&mut self, token: impl Into<String>) -> ApiResult<()> {
        let token = token.into();
        if token.is_empty() {
            return Err(ApiError::config("bot token cannot be empty"));
        }
        self.token = token;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    /// The API server this client was configured for.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns `true` if calls return deferred outcomes.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Switches async mode.
    ///
    /// Switching it off first drains every pending response, so later sync
    /// calls never overlap earlier async ones. Returns the drained futures.
    pub async fn set_async(&mut self, enabled: bool) -> Vec<ResponseFuture> {
        let drained = if enabled {
            Vec::new()
        } else {
            self.async_wait().await
        };
        self.is_async = enabled;
        drained
    }

    /// Sets or clears the callback fired after each successful call.
    ///
    /// Requests already submitted keep the callback they were sent with.
    pub fn on_fulfilled(&mut self, hook: Option<OnFulfilled>) {
        self.hooks.set_on_fulfilled(hook);
    }

    /// Sets or clears the callback fired after each failed call.
    pub fn on_rejected(&mut self, hook: Option<OnRejected>) {
        self.hooks.set_on_rejected(hook);
    }

    // -------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------

    /// Number of async calls submitted since the last drain.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// The most recently submitted request's response handle.
    pub fn last_response(&self) -> Option<ResponseFuture> {
        self.last_response.lock().clone()
    }

    /// Waits for every pending async call, in submission order.
    ///
    /// Failures are logged and dropped; callers that care about a result
    /// should resolve its [`Deferred`] instead. Returns the drained futures,
    /// all settled.
    pub async fn async_wait(&self) -> Vec<ResponseFuture> {
        let drained = std::mem::take(&mut *self.pending.lock());
        if drained.is_empty() {
            return drained;
        }
        debug!(count = drained.len(), "Draining pending responses");
        for future in &drained {
            if let Err(e) = future.wait().await {
                if e.is_suppressible_in_drain() {
                    warn!(endpoint = %future.request().endpoint(), error = %e, "Pending request failed");
                } else {
                    warn!(endpoint = %future.request().endpoint(), error = %e, "Pending request failed unexpectedly");
                }
            }
        }
        drained
    }

    /// Drains pending calls and drops the client.
    pub async fn close(self) {
        self.async_wait().await;
    }

    /// Runs `f` and then drains pending calls, whether `f` succeeded or not.
    pub async fn scoped<R>(&self, f: impl AsyncFnOnce(&Api) -> R) -> R {
        let result = f(self).await;
        self.async_wait().await;
        result
    }

    // -------------------------------------------------------------------------
    // Invocation
    // -------------------------------------------------------------------------

    /// Calls `endpoint` and decodes the response with `decode`.
    ///
    /// Parameters named in `file_keys` are upload slots: each present value
    /// is opened (local path or [`InputFile`](tgbot_core::InputFile)),
    /// wrapped (absolute URL) or left as a string, and the request is sent
    /// as multipart. A file value under any other key is an upload slot too.
    /// Without upload slots the request is form-encoded.
    ///
    /// Validation and configuration errors are returned immediately in both
    /// modes; network and API errors surface when the outcome is resolved.
    pub async fn invoke<T, F>(
        &self,
        endpoint: &str,
        mut params: Params,
        file_keys: &[&str],
        decode: F,
    ) -> ApiResult<Outcome<T>>
    where
        T: Send + 'static,
        F: Fn(&ApiResponse) -> ApiResult<T> + Send + Sync + 'static,
    {
        let upload_keys: Vec<String> = params
            .iter()
            .filter(|(key, value)| file_keys.contains(key) || value.is_file())
            .map(|(key, _)| key.to_string())
            .collect();

        let body = if file_keys.is_empty() && upload_keys.is_empty() {
            RequestBody::form(params)
        } else {
            for key in &upload_keys {
                if let Some(slot) = params.get_mut(key) {
                    let value = std::mem::replace(slot, ParamValue::Null);
                    *slot = prepare_upload(value).await?;
                }
            }
            RequestBody::multipart(params)
        };

        let request = Arc::new(RequestDescriptor::new(
            self.token.as_str(),
            endpoint,
            body,
            self.timeout,
            self.connect_timeout,
            self.is_async,
        ));
        debug!(
            endpoint = %endpoint,
            multipart = request.is_multipart(),
            is_async = self.is_async,
            "Invoking Bot API method"
        );

        let future = ResponseFuture::dispatch(
            Arc::clone(&self.transport),
            request,
            self.hooks.clone(),
        );
        *self.last_response.lock() = Some(future.clone());

        if self.is_async {
            self.pending.lock().push(future.clone());
            return Ok(Outcome::Deferred(Deferred::new(future, Box::new(decode))));
        }

        let response = future.wait().await?;
        Ok(Outcome::Ready(decode(&response)?))
    }

    /// Builds the download URL of a file returned by `getFile`.
    ///
    /// Returns `None` if the server did not provide a path.
    #[cfg(feature = "http-client")]
    pub fn file_url(&self, file: &crate::objects::File) -> Option<String> {
        let path = file.file_path.as_deref()?;
        Some(tgbot_transport::file_url(&self.base_url, &self.token, path))
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport.name())
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("is_async", &self.is_async)
            .field("hooks", &self.hooks)
            .field("pending", &self.pending.lock().len())
            .finish_non_exhaustive()
    }
}

impl Drop for Api {
    fn drop(&mut self) {
        let pending = self.pending.get_mut();
        let unresolved = pending.iter().filter(|f| !f.is_settled()).count();
        if unresolved > 0 {
            warn!(
                unresolved,
                "Api dropped with pending requests; call close() or async_wait() to collect them"
            );
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Api`].
pub struct ApiBuilder {
    token: Option<String>,
    base_url: Option<String>,
    transport: Option<BoxedTransport>,
    timeout: Duration,
    connect_timeout: Duration,
    async_requests: bool,
    hooks: FulfillmentHooks,
}

impl Default for ApiBuilder {
    fn default() -> Self {
        Self {
            token: None,
            base_url: None,
            transport: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            async_requests: false,
            hooks: FulfillmentHooks::new(),
        }
    }
}

impl ApiBuilder {
    /// Sets the bot token. Without one, `TELEGRAM_BOT_TOKEN` is used.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Talks to a different API server (for example a local Bot API server).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Uses a custom transport instead of the HTTP client.
    pub fn transport(mut self, transport: BoxedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn async_requests(mut self, enabled: bool) -> Self {
        self.async_requests = enabled;
        self
    }

    pub fn on_fulfilled(mut self, hook: OnFulfilled) -> Self {
        self.hooks.set_on_fulfilled(Some(hook));
        self
    }

    pub fn on_rejected(mut self, hook: OnRejected) -> Self {
        self.hooks.set_on_rejected(Some(hook));
        self
    }

    /// Builds the client.
    ///
    /// Fails with [`ApiError::Config`] if no token was given and
    /// `TELEGRAM_BOT_TOKEN` is unset or empty.
    pub fn build(self) -> ApiResult<Api> {
        let token = self
            .token
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(BOT_TOKEN_ENV).ok().filter(|t| !t.is_empty()))
            .ok_or_else(|| {
                ApiError::config(format!(
                    "required bot token not supplied and could not find fallback environment variable {BOT_TOKEN_ENV}"
                ))
            })?;

        let base_url = self
            .base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&base_url)?,
        };

        debug!(
            base_url = %base_url,
            transport = transport.name(),
            is_async = self.async_requests,
            "Bot API client created"
        );

        Ok(Api {
            token,
            base_url,
            transport,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            is_async: self.async_requests,
            hooks: self.hooks,
            pending: Mutex::new(Vec::new()),
            last_response: Mutex::new(None),
        })
    }
}

#[cfg(feature = "http-client")]
fn default_transport(base_url: &str) -> ApiResult<BoxedTransport> {
    Ok(Arc::new(tgbot_transport::HttpTransport::with_base_url(base_url)))
}

#[cfg(not(feature = "http-client"))]
fn default_transport(_base_url: &str) -> ApiResult<BoxedTransport> {
    Err(ApiError::config(
        "no transport configured; enable the `http-client` feature or call ApiBuilder::transport",
    ))
}
