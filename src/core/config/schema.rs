//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Config File
//!
//! A config file names a default adapter and a table of adapters. Each
//! adapter describes one metadata service endpoint and how to authenticate
//! against it.
//!
//! # Validation
//!
//! The file is checked structurally when loaded. Completeness (a base URL,
//! credentials for the chosen auth mode) is checked when an adapter is
//! selected, after environment overrides have been applied.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Request timeout used when an adapter does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Placeholder written in place of secrets when displaying config.
pub const REDACTED: &str = "<redacted>";

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// default = "cerpus-metadata"
///
/// [adapters.cerpus-metadata]
/// base_url = "https://metadata.example.com"
/// auth_client = "oauth2"
/// auth_url = "https://auth.example.com"
/// auth_user = "client-id"
/// auth_secret = "client-secret"
/// prefix = "h5p-"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Adapter used when none is named explicitly
    pub default: Option<String>,

    /// Named adapters
    pub adapters: BTreeMap<String, AdapterConfig>,
}

impl FileConfig {
    /// Validate the file structure.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownAdapter` if `default` names a missing
    /// adapter, or `ConfigError::InvalidValue` for an unknown auth mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(default) = &self.default {
            if !self.adapters.contains_key(default) {
                return Err(ConfigError::UnknownAdapter(default.clone()));
            }
        }

        for adapter in self.adapters.values() {
            if let Some(mode) = &adapter.auth_client {
                AuthMode::parse(mode)?;
            }
        }

        Ok(())
    }
}

/// Authentication mode for an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// No authentication
    #[default]
    None,
    /// OAuth 1.0a request signing
    OAuth1,
    /// OAuth 2 client credentials
    OAuth2,
}

impl AuthMode {
    /// Valid auth mode names.
    pub const VALID_MODES: &'static [&'static str] = &["none", "oauth1", "oauth2"];

    /// Parse an auth mode name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the name is not recognized.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.to_lowercase().as_str() {
            "none" | "" => Ok(AuthMode::None),
            "oauth1" => Ok(AuthMode::OAuth1),
            "oauth2" => Ok(AuthMode::OAuth2),
            _ => Err(ConfigError::InvalidValue(format!(
                "invalid auth_client '{}', must be one of: {}",
                name,
                Self::VALID_MODES.join(", ")
            ))),
        }
    }

    /// Get the mode name as used in config files.
    pub fn name(&self) -> &'static str {
        match self {
            AuthMode::None => "none",
            AuthMode::OAuth1 => "oauth1",
            AuthMode::OAuth2 => "oauth2",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings for one metadata service endpoint.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterConfig {
    /// Base URL of the metadata service
    pub base_url: Option<String>,

    /// Auth mode ("none", "oauth1" or "oauth2")
    pub auth_client: Option<String>,

    /// OAuth2 authorization server base URL
    pub auth_url: Option<String>,

    /// OAuth consumer key / client id
    pub auth_user: Option<String>,

    /// OAuth consumer secret / client secret
    pub auth_secret: Option<String>,

    /// OAuth1 access token
    pub auth_token: Option<String>,

    /// OAuth1 access token secret
    pub auth_token_secret: Option<String>,

    /// Prefix applied to non-UUID entity ids
    pub prefix: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

// Secrets stay out of Debug output
impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("base_url", &self.base_url)
            .field("auth_client", &self.auth_client)
            .field("auth_url", &self.auth_url)
            .field("has_auth_user", &self.auth_user.is_some())
            .field("has_auth_secret", &self.auth_secret.is_some())
            .field("has_auth_token", &self.auth_token.is_some())
            .field("has_auth_token_secret", &self.auth_token_secret.is_some())
            .field("prefix", &self.prefix)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AdapterConfig {
    /// Get the configured auth mode.
    ///
    /// Defaults to [`AuthMode::None`] if not configured.
    pub fn auth_mode(&self) -> Result<AuthMode, ConfigError> {
        self.auth_client
            .as_deref()
            .map(AuthMode::parse)
            .unwrap_or(Ok(AuthMode::None))
    }

    /// Get the base URL.
    ///
    /// Returns an empty string if not configured; [`validate`](Self::validate)
    /// rejects that.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or("")
    }

    /// Get the entity prefix.
    ///
    /// Defaults to an empty prefix.
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Check that the adapter is complete for its auth mode.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingValue` for absent required keys and
    /// `ConfigError::InvalidValue` for malformed ones.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = require(&self.base_url, "base_url")?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(format!(
                "base_url must be an http(s) URL, got '{}'",
                base_url
            )));
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        match self.auth_mode()? {
            AuthMode::None => {}
            AuthMode::OAuth1 => {
                require(&self.auth_user, "auth_user")?;
                require(&self.auth_secret, "auth_secret")?;
            }
            AuthMode::OAuth2 => {
                require(&self.auth_user, "auth_user")?;
                require(&self.auth_secret, "auth_secret")?;
                require(&self.auth_url, "auth_url")?;
            }
        }

        Ok(())
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    ///
    /// Each `MDSC_*` variable that is set replaces the matching key.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots: [(&str, &mut Option<String>); 8] = [
            ("MDSC_BASE_URL", &mut self.base_url),
            ("MDSC_AUTH_CLIENT", &mut self.auth_client),
            ("MDSC_AUTH_URL", &mut self.auth_url),
            ("MDSC_AUTH_USER", &mut self.auth_user),
            ("MDSC_AUTH_SECRET", &mut self.auth_secret),
            ("MDSC_AUTH_TOKEN", &mut self.auth_token),
            ("MDSC_AUTH_TOKEN_SECRET", &mut self.auth_token_secret),
            ("MDSC_PREFIX", &mut self.prefix),
        ];

        for (var, slot) in slots {
            if let Some(value) = lookup(var) {
                *slot = Some(value);
            }
        }
    }

    /// Copy of this adapter with every secret replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        let hide = |value: &Option<String>| value.as_ref().map(|_| REDACTED.to_string());
        Self {
            auth_secret: hide(&self.auth_secret),
            auth_token: hide(&self.auth_token),
            auth_token_secret: hide(&self.auth_token_secret),
            ..self.clone()
        }
    }
}

fn require<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str, ConfigError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingValue(key)),
    }
}
