//! Scripted in-process transport for tests.

use async_trait::async_trait;
use bilirq_core::error::TransportError;
use bilirq_core::traits::{Transport, TransportRequest};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues a response body.
    pub(crate) fn respond(&self, body: impl Into<Vec<u8>>) -> &Self {
        self.responses.lock().push_back(Ok(body.into()));
        self
    }

    /// Queues a JSON response body.
    pub(crate) fn respond_json(&self, body: &serde_json::Value) -> &Self {
        self.respond(body.to_string())
    }

    /// Queues a transport failure.
    pub(crate) fn fail(&self, error: TransportError) -> &Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    pub(crate) fn last_request(&self) -> Option<TransportRequest> {
        self.requests.lock().last().cloned()
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<Vec<u8>, TransportError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Err(TransportError::ConnectionFailed {
                reason: "no scripted response".to_string(),
            }))
    }
}
