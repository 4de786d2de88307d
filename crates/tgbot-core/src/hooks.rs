//! Per-request completion callbacks.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiError;
use crate::request::RequestDescriptor;
use crate::response::ApiResponse;

/// Called after each successful API call with the response and elapsed time.
pub type OnFulfilled = Arc<dyn Fn(&ApiResponse, Duration) + Send + Sync>;

/// Called after each failed API call with the request, the error and elapsed time.
pub type OnRejected = Arc<dyn Fn(&RequestDescriptor, &ApiError, Duration) + Send + Sync>;

/// The active fulfillment and rejection callbacks.
///
/// A snapshot is taken whenever a request is dispatched, so replacing a
/// callback only affects requests submitted afterwards.
#[derive(Clone, Default)]
pub struct FulfillmentHooks {
    on_fulfilled: Option<OnFulfilled>,
    on_rejected: Option<OnRejected>,
}

impl FulfillmentHooks {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears the fulfillment callback.
    pub fn set_on_fulfilled(&mut self, hook: Option<OnFulfilled>) {
        self.on_fulfilled = hook;
    }

    /// Sets or clears the rejection callback.
    pub fn set_on_rejected(&mut self, hook: Option<OnRejected>) {
        self.on_rejected = hook;
    }

    /// Invokes the callback matching `outcome`.
    pub fn notify(
        &self,
        request: &RequestDescriptor,
        outcome: &Result<ApiResponse, ApiError>,
        elapsed: Duration,
    ) {
        match outcome {
            Ok(response) => {
                if let Some(hook) = &self.on_fulfilled {
                    hook(response, elapsed);
                }
            }
            Err(err) => {
                if let Some(hook) = &self.on_rejected {
                    hook(request, err, elapsed);
                }
            }
        }
    }
}

impl fmt::Debug for FulfillmentHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FulfillmentHooks")
            .field("on_fulfilled", &self.on_fulfilled.is_some())
            .field("on_rejected", &self.on_rejected.is_some())
            .finish()
    }
}
