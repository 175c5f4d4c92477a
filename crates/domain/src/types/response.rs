//! Per-request response union
//!
//! Every call through the connector ends in either a decoded JSON value or an
//! [`ApiFailure`]. Failures are values; nothing is thrown past `send`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Outcome of a single connector call.
pub type ApiResponse = std::result::Result<Value, ApiFailure>;

/// Error indicator as the server (or the connector) reports it.
///
/// The legacy dialect uses numeric codes (`70`, `-1`), the OAuth2 dialect uses
/// string identifiers (`"unauthorized"`, `"general"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Numeric(i64),
    Named(String),
}

impl ErrorCode {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Numeric(code) => Some(*code),
            Self::Named(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Numeric(_) => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(code) => write!(f, "{code}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        Self::Numeric(code)
    }
}

impl From<&str> for ErrorCode {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

/// Where a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection error, timeout, or a failing status without a JSON error body
    Transport,
    /// The server answered with no content
    EmptyResponse,
    /// The server answered with something that is not JSON (or not the
    /// expected shape)
    MalformedResponse,
    /// The outbound payload could not be serialized
    InvalidPayload,
    /// A well-formed error reported by the API itself
    Application,
}

/// Structured error value returned from a connector call.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("[{code}] {description}")]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub code: ErrorCode,
    pub description: String,
    /// HTTP status of the response that carried the failure, when there was one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Raw decoded error body for application failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiFailure {
    pub fn new(kind: FailureKind, code: ErrorCode, description: impl Into<String>) -> Self {
        Self { kind, code, description: description.into(), status: None, body: None }
    }

    /// Error reported by the API in its own response body.
    pub fn application(code: ErrorCode, description: impl Into<String>, body: Value) -> Self {
        Self {
            kind: FailureKind::Application,
            code,
            description: description.into(),
            status: None,
            body: Some(body),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_application(&self) -> bool {
        self.kind == FailureKind::Application
    }
}
