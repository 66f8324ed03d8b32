//! transport::factory
//!
//! Transport creation from adapter configuration.
//!
//! # Design
//!
//! Commands use [`create_transport`] instead of building an
//! [`HttpTransport`] and authenticator themselves, so the auth mode switch
//! lives in one place.
//!
//! # Example
//!
//! ```ignore
//! use metadata_service_client::core::config::Config;
//! use metadata_service_client::transport::create_transport;
//!
//! let adapter = Config::load(None)?.adapter(None)?;
//! let transport = create_transport(&adapter)?;
//! ```

use std::sync::Arc;

use super::http::HttpTransport;
use super::traits::Transport;
use crate::auth::{
    Anonymous, Authenticator, OAuth1Credentials, OAuth1Signer, OAuth2ClientCredentials,
};
use crate::core::config::{AdapterConfig, AuthMode, ConfigError};

/// Build the authenticator for an adapter's auth mode.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for an unknown auth mode and
/// `ConfigError::MissingValue` for absent credentials.
pub fn create_authenticator(adapter: &AdapterConfig) -> Result<Arc<dyn Authenticator>, ConfigError> {
    let value = |slot: &Option<String>, key: &'static str| {
        slot.clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingValue(key))
    };

    Ok(match adapter.auth_mode()? {
        AuthMode::None => Arc::new(Anonymous),
        AuthMode::OAuth1 => Arc::new(OAuth1Signer::new(OAuth1Credentials {
            consumer_key: value(&adapter.auth_user, "auth_user")?,
            consumer_secret: value(&adapter.auth_secret, "auth_secret")?,
            token: adapter.auth_token.clone(),
            token_secret: adapter.auth_token_secret.clone(),
        })),
        AuthMode::OAuth2 => Arc::new(OAuth2ClientCredentials::new(
            &value(&adapter.auth_url, "auth_url")?,
            &value(&adapter.auth_user, "auth_user")?,
            &value(&adapter.auth_secret, "auth_secret")?,
        )),
    })
}

/// Create a transport from an adapter.
///
/// This is the primary entry point for creating transports in commands.
///
/// # Errors
///
/// Returns a `ConfigError` if the adapter is incomplete or the HTTP client
/// cannot be built.
pub fn create_transport(adapter: &AdapterConfig) -> Result<Arc<dyn Transport>, ConfigError> {
    adapter.validate()?;
    let authenticator = create_authenticator(adapter)?;
    let transport = HttpTransport::new(adapter.base_url(), authenticator, adapter.timeout())
        .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
    Ok(Arc::new(transport))
}
