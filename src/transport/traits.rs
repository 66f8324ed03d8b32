//! transport::traits
//!
//! Transport trait definition and request/response types.
//!
//! # Design
//!
//! The `Transport` trait is async because every metadata operation is a
//! network round trip. A transport turns a [`Request`] into a [`Response`]
//! and reports any non-2xx answer as [`TransportError::Status`], so callers
//! only ever see successful responses on the `Ok` path.
//!
//! Paths are relative to the service base URL and always start with `/`.
//!
//! # Example
//!
//! ```ignore
//! use metadata_service_client::transport::{Request, Transport};
//!
//! async fn keywords(transport: &dyn Transport) -> Result<String, TransportError> {
//!     let response = transport
//!         .send(Request::get("/v1/keywords").with_query("prefix", "ma"))
//!         .await?;
//!     Ok(response.body)
//! }
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;

/// Longest server message carried in an error.
const MAX_ERROR_MESSAGE_LEN: usize = 200;

/// Errors from transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Credentials could not be attached to the request.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl TransportError {
    /// HTTP status of the answer, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Path relative to the base URL, starting with `/`
    pub path: String,
    /// Query parameters, unencoded
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
}

impl Request {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path, Some(body))
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path, Some(body))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path, None)
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Look up a query parameter by name.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the body is empty or whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// The Transport trait for talking to the metadata service.
///
/// # Implementors
///
/// - [`HttpTransport`](super::http::HttpTransport) - reqwest-based HTTP client
/// - [`MockTransport`](super::mock::MockTransport) - in-memory routes for tests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Get the transport name (e.g., "http", "mock").
    fn name(&self) -> &'static str;

    /// Send a request.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Status`] for any non-2xx answer
    /// - [`TransportError::Network`] / [`TransportError::Timeout`] if no answer arrived
    /// - [`TransportError::Auth`] if credentials could not be attached
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error", alias = "detail")]
    message: String,
}

/// Extract a readable error message from an error response body.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if !parsed.message.is_empty() {
            return parsed.message;
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}
