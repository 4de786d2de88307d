//! Ready and deferred call results.
//!
//! Every API method returns an [`Outcome`]. With async requests disabled the
//! call has already completed and the outcome is [`Outcome::Ready`]; with
//! async requests enabled the call is still in flight and the outcome is a
//! [`Deferred`] that resolves later.

use std::fmt;

use tgbot_core::{ApiResponse, ApiResult, ResponseFuture};

pub(crate) type Decoder<T> = Box<dyn Fn(&ApiResponse) -> ApiResult<T> + Send + Sync>;

/// The result of an API method.
pub enum Outcome<T> {
    /// The decoded result of a completed call.
    Ready(T),
    /// A call that is still in flight.
    Deferred(Deferred<T>),
}

impl<T> Outcome<T> {
    /// Returns the value, waiting for a deferred call if needed.
    pub async fn resolve(self) -> ApiResult<T> {
        match self {
            Self::Ready(value) => Ok(value),
            Self::Deferred(deferred) => deferred.resolve().await,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns the value of a completed call.
    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }

    /// Returns the pending call, if any.
    pub fn into_deferred(self) -> Option<Deferred<T>> {
        match self {
            Self::Ready(_) => None,
            Self::Deferred(deferred) => Some(deferred),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Deferred(deferred) => f.debug_tuple("Deferred").field(deferred).finish(),
        }
    }
}

/// A call submitted in async mode.
///
/// Resolving waits for the response, surfaces its error if it failed, and
/// otherwise decodes it. Resolving twice never sends the request again.
pub struct Deferred<T> {
    future: ResponseFuture,
    decode: Decoder<T>,
}

impl<T> Deferred<T> {
    pub(crate) fn new(future: ResponseFuture, decode: Decoder<T>) -> Self {
        Self { future, decode }
    }

    /// Waits for the call and decodes its result.
    pub async fn resolve(&self) -> ApiResult<T> {
        let response = self.future.wait().await?;
        (self.decode)(&response)
    }

    /// The underlying response handle.
    pub fn future(&self) -> &ResponseFuture {
        &self.future
    }

    pub fn is_settled(&self) -> bool {
        self.future.is_settled()
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("future", &self.future)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use tgbot_core::{ApiError, Params, RawResponse, RequestBody, RequestDescriptor};

    fn request() -> Arc<RequestDescriptor> {
        Arc::new(RequestDescriptor::new(
            "1:t",
            "getChatMembersCount",
            RequestBody::form(Params::new()),
            Duration::from_secs(1),
            Duration::from_secs(1),
            true,
        ))
    }

    fn settled(body: serde_json::Value) -> ResponseFuture {
        let request = request();
        let raw = RawResponse::new(200, body.to_string());
        let outcome = ApiResponse::classify(Arc::clone(&request), Ok(raw));
        ResponseFuture::settled(request, outcome)
    }

    #[tokio::test]
    async fn test_ready_resolves_immediately() {
        let outcome = Outcome::Ready(3);
        assert!(outcome.is_ready());
        assert_eq!(outcome.resolve().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_deferred_decodes_each_time() {
        let deferred: Deferred<i64> = Deferred::new(
            settled(json!({"ok": true, "result": 12})),
            Box::new(|response: &ApiResponse| response.decode_result()),
        );
        assert!(deferred.is_settled());
        assert_eq!(deferred.resolve().await.unwrap(), 12);
        assert_eq!(deferred.resolve().await.unwrap(), 12);

        let outcome = Outcome::Deferred(deferred);
        assert!(outcome.into_ready().is_none());
    }

    #[tokio::test]
    async fn test_deferred_surfaces_remote_error() {
        let deferred: Deferred<i64> = Deferred::new(
            settled(json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"})),
            Box::new(|response: &ApiResponse| response.decode_result()),
        );
        let err = deferred.resolve().await.unwrap_err();
        assert!(matches!(err, ApiError::Remote { error_code: Some(400), .. }));
    }
}
