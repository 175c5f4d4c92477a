//! Error types used throughout the connector

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for connector construction, configuration and storage.
///
/// Per-request failures are not reported through this type; see
/// [`crate::ApiFailure`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ConnectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for connector operations
pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Failure below the JSON layer: connection refused, TLS, timeout.
///
/// Carried as a plain description; the dispatcher never classifies it further.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<TransportError> for ConnectorError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err.0)
    }
}
