//! auth - Request authentication for the metadata service
//!
//! The metadata service is deployed behind one of three schemes, and the
//! transport treats them interchangeably through the [`Authenticator`] trait.
//!
//! # Components
//!
//! - [`Anonymous`] - Sends no credentials
//! - [`OAuth1Signer`] - Signs every request with OAuth 1.0a HMAC-SHA1
//! - [`OAuth2ClientCredentials`] - Fetches and caches a client-credentials bearer token
//!
//! # Security
//!
//! Credentials never appear in logs, errors, or `Debug` output. All types in
//! this module implement custom Debug to redact secret values.
//!
//! # Example
//!
//! ```ignore
//! use metadata_service_client::auth::{Authenticator, SigningRequest, OAuth2ClientCredentials};
//!
//! let auth = OAuth2ClientCredentials::new("https://auth.example.com", "client", "secret");
//! let header = auth
//!     .authorization(&SigningRequest::new("GET", "https://metadata.example.com/v1/keywords", &[]))
//!     .await?;
//! ```

mod errors;
mod oauth1;
mod oauth2;

pub use errors::AuthError;
pub use oauth1::{OAuth1Credentials, OAuth1Signer};
pub use oauth2::{OAuth2ClientCredentials, EXPIRY_BUFFER_SECS};

use async_trait::async_trait;

/// The parts of an outgoing request that authentication may depend on.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    /// Upper-case HTTP method
    pub method: &'a str,
    /// Absolute URL without query string
    pub url: &'a str,
    /// Query parameters, unencoded
    pub query: &'a [(String, String)],
}

impl<'a> SigningRequest<'a> {
    pub fn new(method: &'a str, url: &'a str, query: &'a [(String, String)]) -> Self {
        Self { method, url, query }
    }
}

/// Produces the `Authorization` header for a request.
///
/// # Implementation Notes
///
/// Implementors must:
/// - Return `Ok(None)` when the request should go out unauthenticated
/// - Never log or expose credential values
/// - Be safe to call concurrently; `get_all` authorizes many requests at once
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Short scheme name for diagnostics ("none", "oauth1", "oauth2").
    fn scheme(&self) -> &'static str;

    /// Compute the `Authorization` header value for `request`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if credentials cannot be obtained.
    async fn authorization(&self, request: &SigningRequest<'_>) -> Result<Option<String>, AuthError>;
}

/// Authenticator that sends no credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

#[async_trait]
impl Authenticator for Anonymous {
    fn scheme(&self) -> &'static str {
        "none"
    }

    async fn authorization(&self, _request: &SigningRequest<'_>) -> Result<Option<String>, AuthError> {
        Ok(None)
    }
}
