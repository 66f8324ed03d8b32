//! transport::http
//!
//! HTTP transport using reqwest.
//!
//! # Design
//!
//! One `reqwest::Client` is built per transport with the adapter's timeout.
//! Every request asks the configured [`Authenticator`] for an
//! `Authorization` header immediately before sending, so OAuth1 signatures
//! are computed over the exact URL and query that go on the wire and OAuth2
//! tokens are refreshed lazily.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use metadata_service_client::auth::Anonymous;
//! use metadata_service_client::transport::{http::HttpTransport, Request, Transport};
//!
//! let transport = HttpTransport::new(
//!     "http://localhost:8080",
//!     Arc::new(Anonymous),
//!     Duration::from_secs(10),
//! )?;
//! let response = transport.send(Request::get("/v1/keywords")).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use super::traits::{error_message, Request, Response, Transport, TransportError};
use crate::auth::{Anonymous, Authenticator, SigningRequest};
use crate::core::config::schema::DEFAULT_TIMEOUT_SECS;

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("mdsc/", env!("CARGO_PKG_VERSION"));

/// Transport that talks HTTP to a metadata service.
pub struct HttpTransport {
    /// HTTP client for making requests
    client: Client,
    /// Service base URL without trailing slash
    base_url: String,
    /// Produces the Authorization header for each request
    authenticator: Arc<dyn Authenticator>,
}

// Custom Debug to avoid exposing credentials
impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("auth", &self.authenticator.scheme())
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Network` if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        authenticator: Arc<dyn Authenticator>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authenticator,
        })
    }

    /// Create an unauthenticated transport with the default timeout.
    pub fn anonymous(base_url: &str) -> Result<Self, TransportError> {
        Self::new(
            base_url,
            Arc::new(Anonymous),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Get the service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let url = self.url(&request.path);
        let authorization = self
            .authenticator
            .authorization(&SigningRequest::new(
                request.method.as_str(),
                &url,
                &request.query,
            ))
            .await?;

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, %url, "sending request");

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        debug!(method = %request.method, %url, status, "received response");

        if !(200..300).contains(&status) {
            return Err(TransportError::Status {
                status,
                message: error_message(status, &body),
            });
        }

        Ok(Response { status, body })
    }
}
