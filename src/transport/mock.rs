//! transport::mock
//!
//! Mock transport for deterministic testing.
//!
//! # Design
//!
//! Replies are registered per `(method, path)` route. Each route holds a
//! queue: replies are consumed in order and the last one repeats for every
//! later request. A request to an unregistered route answers 404, which is
//! how the metadata service reports "nothing here".
//!
//! Every request is recorded so tests can assert what was sent, including
//! that nothing was sent at all.
//!
//! # Example
//!
//! ```
//! use metadata_service_client::transport::mock::{MockReply, MockTransport};
//! use metadata_service_client::transport::{Method, Request, Transport};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::new()
//!     .on(Method::Get, "/v1/keywords", MockReply::json(200, json!([])));
//!
//! let response = transport.send(Request::get("/v1/keywords")).await.unwrap();
//! assert_eq!(response.body, "[]");
//! assert_eq!(transport.request_count(), 1);
//!
//! let err = transport.send(Request::get("/v1/other")).await.unwrap_err();
//! assert!(err.is_not_found());
//! # });
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{error_message, Method, Request, Response, Transport, TransportError};

/// A canned reply for a route.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with a status and raw body.
    Respond { status: u16, body: String },
    /// Fail without an answer.
    Fail(TransportError),
}

impl MockReply {
    /// Answer with a JSON body.
    pub fn json(status: u16, body: Value) -> Self {
        MockReply::Respond {
            status,
            body: body.to_string(),
        }
    }

    /// Answer with a raw body.
    pub fn raw(status: u16, body: &str) -> Self {
        MockReply::Respond {
            status,
            body: body.to_string(),
        }
    }

    /// Answer with an empty body.
    pub fn status(status: u16) -> Self {
        Self::raw(status, "")
    }

    /// Fail with a transport error.
    pub fn fail(err: TransportError) -> Self {
        MockReply::Fail(err)
    }
}

/// Mock transport for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share routes
/// and recorded requests.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    /// Reply queues by route.
    routes: HashMap<(Method, String), VecDeque<MockReply>>,
    /// Recorded requests for verification.
    requests: Vec<Request>,
}

impl MockTransport {
    /// Create a mock with no routes; every request answers 404.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reply and return the mock (builder style).
    pub fn on(self, method: Method, path: &str, reply: MockReply) -> Self {
        self.push(method, path, reply);
        self
    }

    /// Queue a reply for a route.
    pub fn push(&self, method: Method, path: &str, reply: MockReply) {
        self.lock()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// Get the number of recorded requests.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Get recorded requests for one route.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Request> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    /// Clear recorded requests.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_reply(&self, method: Method, path: &str) -> Option<MockReply> {
        let mut inner = self.lock();
        let queue = inner.routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let (method, path) = (request.method, request.path.clone());
        self.lock().requests.push(request);

        match self
            .next_reply(method, &path)
            .unwrap_or_else(|| MockReply::status(404))
        {
            MockReply::Fail(err) => Err(err),
            MockReply::Respond { status, body } if (200..300).contains(&status) => {
                Ok(Response { status, body })
            }
            MockReply::Respond { status, body } => Err(TransportError::Status {
                status,
                message: error_message(status, &body),
            }),
        }
    }
}
