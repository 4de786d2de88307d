//! In-memory transport for tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

use tgbot_core::{RawResponse, RequestDescriptor, Transport, TransportError, TransportResult};

/// Records every request and answers from a script.
///
/// Unscripted requests get `{"ok": true, "result": true}`. A gated
/// transport holds each request until [`release`](Self::release) is called.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<Arc<RequestDescriptor>>>,
    script: Mutex<VecDeque<TransportResult<RawResponse>>>,
    gate: Option<Semaphore>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Semaphore::new(0)),
            ..Default::default()
        })
    }

    /// Queues a successful envelope around `result`.
    pub(crate) fn respond_ok(&self, result: Value) {
        self.respond(200, json!({"ok": true, "result": result}));
    }

    pub(crate) fn respond(&self, status: u16, body: Value) {
        self.script
            .lock()
            .push_back(Ok(RawResponse::new(status, body.to_string())));
    }

    pub(crate) fn fail(&self, error: TransportError) {
        self.script.lock().push_back(Err(error));
    }

    /// Lets `n` held requests complete.
    pub(crate) fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub(crate) fn requests(&self) -> Vec<Arc<RequestDescriptor>> {
        self.requests.lock().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub(crate) fn last_request(&self) -> Option<Arc<RequestDescriptor>> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: Arc<RequestDescriptor>) -> TransportResult<RawResponse> {
        self.requests.lock().push(request);
        let scripted = self.script.lock().pop_front();
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| TransportError::Aborted(e.to_string()))?
                .forget();
        }
        scripted.unwrap_or_else(|| {
            Ok(RawResponse::new(
                200,
                json!({"ok": true, "result": true}).to_string(),
            ))
        })
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
