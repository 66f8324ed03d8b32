//! auth::errors
//!
//! Authentication error types.
//!
//! # Design
//!
//! Error messages never contain credentials. Token endpoint bodies are
//! included only when the endpoint rejected the request, where they carry the
//! server's explanation rather than a token.
//!
//! # Example
//!
//! ```
//! use metadata_service_client::auth::AuthError;
//!
//! let err = AuthError::MissingCredential("auth_secret");
//! assert!(err.to_string().contains("auth_secret"));
//! ```

use thiserror::Error;

/// Errors from authentication operations.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// A credential required by the auth mode is not configured.
    #[error("missing credential '{0}'")]
    MissingCredential(&'static str),

    /// The token endpoint rejected the request.
    #[error("token request failed: {status} - {message}")]
    TokenRequest {
        /// HTTP status code
        status: u16,
        /// Error message from the token endpoint
        message: String,
    },

    /// The token endpoint answered with something other than a token.
    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),

    /// Network error while talking to the token endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// A request could not be signed.
    #[error("signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// Check if this error indicates a transient failure that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Network(_) => true,
            AuthError::TokenRequest { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err.to_string())
    }
}
