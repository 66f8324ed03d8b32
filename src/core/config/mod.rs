//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! A config file holds any number of named adapters (metadata service
//! endpoints) and optionally names the default one. Environment variables
//! override individual keys of whichever adapter is selected, so a complete
//! adapter can also be described by the environment alone.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. The selected adapter from the config file
//! 3. `MDSC_*` environment variables
//! 4. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. An explicit path passed to [`Config::load`]
//! 2. `$MDSC_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/mdsc/config.toml`
//! 4. `~/.mdsc/config.toml` (canonical location)
//!
//! # Example
//!
//! ```no_run
//! use metadata_service_client::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! let adapter = config.adapter(None).unwrap();
//! assert!(adapter.base_url().starts_with("http"));
//! let mode = adapter.auth_mode().unwrap();
//! ```

pub mod schema;

pub use schema::{AdapterConfig, AuthMode, FileConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("missing required config value '{0}'")]
    MissingValue(&'static str),

    #[error("no adapter named '{0}' is configured")]
    UnknownAdapter(String),

    #[error("several adapters are configured; set `default` or choose one explicitly")]
    AmbiguousAdapter,

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed config file contents (empty when no file was found)
    pub file: FileConfig,
    /// Path the config was loaded from
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise the standard locations are
    /// searched and a missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read, parsed or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(),
        };

        let file = match &path {
            Some(path) => Self::read_file(path)?,
            None => FileConfig::default(),
        };
        file.validate()?;

        Ok(Config { file, path })
    }

    /// Find the first existing config file in the standard locations.
    fn discover() -> Option<PathBuf> {
        // 1. Check $MDSC_CONFIG
        if let Ok(path) = std::env::var("MDSC_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/mdsc/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("mdsc/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.mdsc/config.toml
        let path = Self::default_path().ok()?;
        path.exists().then_some(path)
    }

    /// Read and parse a config file.
    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical config path.
    ///
    /// Returns `~/.mdsc/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".mdsc/config.toml"))
    }

    /// Get the path the configuration was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Select an adapter, apply environment overrides and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the adapter cannot be selected or is incomplete.
    pub fn adapter(&self, name: Option<&str>) -> Result<AdapterConfig, ConfigError> {
        self.adapter_with(name, |var| std::env::var(var).ok())
    }

    /// Like [`adapter`](Self::adapter), reading overrides from `lookup`.
    ///
    /// Selection rules:
    /// - an explicit `name` must exist
    /// - otherwise the file's `default` is used
    /// - otherwise a single configured adapter is used
    /// - with no adapters at all, an empty adapter is filled from overrides
    pub fn adapter_with<F>(&self, name: Option<&str>, lookup: F) -> Result<AdapterConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let adapters = &self.file.adapters;
        let mut adapter = match name.or(self.file.default.as_deref()) {
            Some(name) => adapters
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownAdapter(name.to_string()))?,
            None => match adapters.len() {
                0 => AdapterConfig::default(),
                1 => adapters.values().next().cloned().unwrap_or_default(),
                _ => return Err(ConfigError::AmbiguousAdapter),
            },
        };

        adapter.apply_overrides(lookup);
        adapter.validate()?;
        Ok(adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(temp: &TempDir, contents: &str) -> PathBuf {
        let path = temp.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
            default = "primary"

            [adapters.primary]
            base_url = "https://metadata.example.com"
            prefix = "h5p-"
            "#,
        );

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.loaded_from(), Some(path.as_path()));

        let adapter = config.adapter_with(None, no_env).unwrap();
        assert_eq!(adapter.base_url(), "https://metadata.example.com");
        assert_eq!(adapter.prefix(), "h5p-");
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn parse_error_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "default = [");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn named_adapter_selected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
            [adapters.staging]
            base_url = "https://staging.example.com"

            [adapters.production]
            base_url = "https://metadata.example.com"
            "#,
        );

        let config = Config::load(Some(&path)).unwrap();
        let adapter = config.adapter_with(Some("staging"), no_env).unwrap();
        assert_eq!(adapter.base_url(), "https://staging.example.com");

        assert!(matches!(
            config.adapter_with(None, no_env),
            Err(ConfigError::AmbiguousAdapter)
        ));
        assert!(matches!(
            config.adapter_with(Some("dev"), no_env),
            Err(ConfigError::UnknownAdapter(_))
        ));
    }

    #[test]
    fn environment_only_adapter() {
        let config = Config::default();
        let adapter = config
            .adapter_with(None, |var| match var {
                "MDSC_BASE_URL" => Some("http://localhost:8080".to_string()),
                "MDSC_AUTH_CLIENT" => Some("none".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(adapter.base_url(), "http://localhost:8080");
        assert_eq!(adapter.auth_mode().unwrap(), AuthMode::None);
    }

    #[test]
    fn empty_config_without_env_is_incomplete() {
        let config = Config::default();
        assert!(matches!(
            config.adapter_with(None, no_env),
            Err(ConfigError::MissingValue("base_url"))
        ));
    }

    #[test]
    fn environment_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
            [adapters.primary]
            base_url = "https://metadata.example.com"
            auth_client = "oauth1"
            auth_user = "key"
            auth_secret = "secret"
            "#,
        );

        let config = Config::load(Some(&path)).unwrap();
        let adapter = config
            .adapter_with(None, |var| {
                (var == "MDSC_AUTH_CLIENT").then(|| "none".to_string())
            })
            .unwrap();

        assert_eq!(adapter.auth_mode().unwrap(), AuthMode::None);
        assert_eq!(adapter.auth_user.as_deref(), Some("key"));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
            default_adapter = "primary"
            "#,
        );
        assert!(Config::load(Some(&path)).is_err());
    }
}
