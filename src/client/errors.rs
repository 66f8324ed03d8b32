//! client::errors
//!
//! Domain error taxonomy and the transport error classifier.
//!
//! # Classification
//!
//! | Transport outcome            | Domain error                       |
//! |------------------------------|------------------------------------|
//! | non-2xx status               | `Transport { status: Some(..) }`   |
//! | connection failure / timeout | `Transport { status: None }`       |
//! | authentication failure       | `Auth` (unchanged)                 |
//! | unparseable or empty body    | `MalformedResponse`                |
//!
//! 404 is interpreted by each operation before classification; reads and
//! deletes turn it into an absent result.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;
use crate::core::types::TypeError;
use crate::transport::{Response, TransportError};

/// Errors from metadata operations.
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    /// The entity or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service answered, but not with what the operation requires.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The service answered with an unexpected status, or not at all.
    #[error("metadata service error{}: {message}", status_suffix(.status))]
    Transport {
        /// HTTP status, absent for connection-level failures
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// The facet name is not in the facet table.
    #[error("unknown meta type '{0}'")]
    UnknownMetaType(String),

    /// The custom field has no definition in the service.
    #[error("field '{0}' is not defined in the metadata service; define it before setting a value")]
    FieldNotDefined(String),

    /// An argument is unusable as given.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Credentials could not be attached to a request.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl MetadataError {
    /// Whether the caller passed something unusable; retrying cannot help.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            MetadataError::UnknownMetaType(_)
                | MetadataError::FieldNotDefined(_)
                | MetadataError::InvalidArgument(_)
        )
    }

    /// The HTTP status the service answered with, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            MetadataError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether this error means "does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetadataError::NotFound(_)) || self.status() == Some(404)
    }
}

impl From<TransportError> for MetadataError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status, message } => MetadataError::Transport {
                status: Some(status),
                message,
            },
            TransportError::Auth(err) => MetadataError::Auth(err),
            other @ (TransportError::Network(_) | TransportError::Timeout(_)) => {
                MetadataError::Transport {
                    status: None,
                    message: other.to_string(),
                }
            }
        }
    }
}

impl From<TypeError> for MetadataError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnknownMetaType(name) => MetadataError::UnknownMetaType(name),
        }
    }
}

/// Decode a response body, classifying empty or invalid JSON as malformed.
pub(crate) fn decode<T: DeserializeOwned>(response: &Response) -> Result<T, MetadataError> {
    if response.is_empty() {
        return Err(MetadataError::MalformedResponse(
            "empty response body".to_string(),
        ));
    }
    response
        .json()
        .map_err(|e| MetadataError::MalformedResponse(e.to_string()))
}

/// Decode a body that must carry a value.
pub(crate) fn decode_non_empty(response: &Response) -> Result<Value, MetadataError> {
    let value: Value = decode(response)?;
    if is_empty_value(&value) {
        return Err(MetadataError::MalformedResponse("result was empty".to_string()));
    }
    Ok(value)
}

/// Null, `false`, `""` and `[]` carry no result.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
