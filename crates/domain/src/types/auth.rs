//! Auth dialect and credential types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConnectorError;

/// Protocol dialect spoken by the remote host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `uid` + `master_token` exchanged for a `Session-Token` header
    Legacy,
    /// OAuth2 client-credentials exchanged for a bearer token
    #[default]
    OAuth2,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::OAuth2 => "oauth2",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ConnectorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" | "session" => Ok(Self::Legacy),
            "oauth2" | "oauth" => Ok(Self::OAuth2),
            other => Err(ConnectorError::Config(format!("Unknown auth dialect: {other}"))),
        }
    }
}

/// Client identifier and secret used for the auth exchange.
///
/// For the legacy dialect these are the auth UID and master token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
