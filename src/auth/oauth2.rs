//! auth::oauth2
//!
//! OAuth 2 client-credentials flow.
//!
//! # Token Lifecycle
//!
//! The first request fetches a token from `{auth_url}/oauth/token` with
//! `grant_type=client_credentials`. The token is cached in memory and reused
//! until it is within [`EXPIRY_BUFFER_SECS`] of expiring, after which the
//! next request fetches a new one. Tokens without `expires_in` are cached for
//! the lifetime of the authenticator.
//!
//! Concurrent callers share a single fetch: the cache lock is held across
//! the token request.
//!
//! # Example
//!
//! ```ignore
//! use metadata_service_client::auth::{Authenticator, OAuth2ClientCredentials, SigningRequest};
//!
//! let auth = OAuth2ClientCredentials::new("https://auth.example.com", "client", "secret");
//! let header = auth.authorization(&SigningRequest::new("GET", url, &[])).await?;
//! assert!(header.unwrap().starts_with("Bearer "));
//! ```

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::errors::AuthError;
use super::{Authenticator, SigningRequest};

/// Seconds before expiry at which a cached token is considered stale.
pub const EXPIRY_BUFFER_SECS: i64 = 30;

/// Successful token response.
#[derive(Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Form body for the token endpoint.
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            expires_at: response
                .expires_in
                .map(|secs| now + Duration::seconds(secs)),
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(EXPIRY_BUFFER_SECS) < expires_at,
            None => true,
        }
    }
}

/// Authenticator using the OAuth 2 client-credentials grant.
pub struct OAuth2ClientCredentials {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for OAuth2ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2ClientCredentials")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl OAuth2ClientCredentials {
    /// Create an authenticator for the authorization server at `auth_url`.
    pub fn new(auth_url: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            client: Client::new(),
            token_url: format!("{}/oauth/token", auth_url.trim_end_matches('/')),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Get the token endpoint URL.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Drop any cached token so the next request fetches a new one.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    /// Return a valid access token, fetching one if needed.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenRequest`] if the endpoint rejects the credentials
    /// - [`AuthError::InvalidTokenResponse`] if the answer is not a token
    /// - [`AuthError::Network`] on connection failure
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.access_token.clone());
        }

        let response = self.fetch_token().await?;
        let token = CachedToken::from_response(response, now);
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn fetch_token(&self) -> Result<TokenResponse, AuthError> {
        if self.client_id.is_empty() {
            return Err(AuthError::MissingCredential("auth_user"));
        }
        if self.client_secret.is_empty() {
            return Err(AuthError::MissingCredential("auth_secret"));
        }

        debug!(url = %self.token_url, "requesting client credentials token");

        let request = TokenRequest {
            grant_type: "client_credentials",
            client_id: &self.client_id,
            client_secret: &self.client_secret,
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(&self.token_url)
            .headers(headers)
            .form(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AuthError::TokenRequest {
                status: status.as_u16(),
                message: body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))?;

        if let Some(kind) = token.token_type.as_deref() {
            if !kind.eq_ignore_ascii_case("bearer") {
                return Err(AuthError::InvalidTokenResponse(format!(
                    "unsupported token type '{}'",
                    kind
                )));
            }
        }
        if token.access_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse(
                "empty access_token".to_string(),
            ));
        }

        Ok(token)
    }
}

#[async_trait]
impl Authenticator for OAuth2ClientCredentials {
    fn scheme(&self) -> &'static str {
        "oauth2"
    }

    async fn authorization(&self, _request: &SigningRequest<'_>) -> Result<Option<String>, AuthError> {
        let token = self.access_token().await?;
        Ok(Some(format!("Bearer {}", token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> SigningRequest<'static> {
        SigningRequest::new("GET", "http://localhost/v1/keywords", &[])
    }

    mod cached_token {
        use super::*;

        #[test]
        fn fresh_until_buffer() {
            let now = Utc::now();
            let token = CachedToken {
                access_token: "t".into(),
                expires_at: Some(now + Duration::seconds(EXPIRY_BUFFER_SECS + 10)),
            };
            assert!(token.is_fresh(now));
            assert!(!token.is_fresh(now + Duration::seconds(20)));
        }

        #[test]
        fn no_expiry_is_always_fresh() {
            let token = CachedToken {
                access_token: "t".into(),
                expires_at: None,
            };
            assert!(token.is_fresh(Utc::now() + Duration::days(365)));
        }
    }

    #[tokio::test]
    async fn fetches_and_caches_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=client"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "abc123",
                "token_type": "bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = OAuth2ClientCredentials::new(&server.uri(), "client", "secret");
        let first = auth.authorization(&request()).await.unwrap();
        let second = auth.authorization(&request()).await.unwrap();

        assert_eq!(first.as_deref(), Some("Bearer abc123"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn short_lived_token_is_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "short",
                "expires_in": 5
            })))
            .expect(2)
            .mount(&server)
            .await;

        let auth = OAuth2ClientCredentials::new(&server.uri(), "client", "secret");
        auth.access_token().await.unwrap();
        auth.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let auth = OAuth2ClientCredentials::new(&server.uri(), "client", "wrong");
        let err = auth.access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRequest { status: 401, .. }));
    }

    #[tokio::test]
    async fn malformed_token_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let auth = OAuth2ClientCredentials::new(&server.uri(), "client", "secret");
        assert!(matches!(
            auth.access_token().await,
            Err(AuthError::InvalidTokenResponse(_))
        ));
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "abc"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let auth = OAuth2ClientCredentials::new(&server.uri(), "client", "secret");
        auth.access_token().await.unwrap();
        auth.invalidate().await;
        auth.access_token().await.unwrap();
    }

    #[test]
    fn token_url_trims_trailing_slash() {
        let auth = OAuth2ClientCredentials::new("https://auth.example.com/", "c", "s");
        assert_eq!(auth.token_url(), "https://auth.example.com/oauth/token");
    }

    #[test]
    fn debug_hides_secret() {
        let auth = OAuth2ClientCredentials::new("https://auth.example.com", "c", "hunter2");
        assert!(!format!("{:?}", auth).contains("hunter2"));
    }

    #[tokio::test]
    async fn missing_secret() {
        let auth = OAuth2ClientCredentials::new("http://127.0.0.1:1", "client", "");
        assert!(matches!(
            auth.access_token().await,
            Err(AuthError::MissingCredential("auth_secret"))
        ));
    }
}
