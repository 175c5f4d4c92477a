//! Connector configuration

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::DEFAULT_TIMEOUT_SECS;
use crate::errors::{ConnectorError, Result};
use crate::types::{Credentials, Dialect};

/// Everything a connector needs to reach and authenticate against a host.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Host with or without scheme, e.g. `api.example.com` or
    /// `http://localhost:8080`. A missing scheme means `https://`.
    pub host: String,
    #[serde(default)]
    pub dialect: Dialect,
    /// Client ID (OAuth2) or auth UID (legacy)
    #[serde(default)]
    pub client_id: Option<String>,
    /// Client secret (OAuth2) or master token (legacy)
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,
    /// Raw `Name: value` header lines added to every request
    #[serde(default)]
    pub custom_headers: Vec<String>,
    #[serde(default)]
    pub debug: bool,
    /// Per-request timeout; `0` disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ConnectorConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            dialect: Dialect::default(),
            client_id: None,
            client_secret: None,
            custom_headers: Vec::new(),
            debug: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    #[must_use]
    pub fn with_custom_headers<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_headers = lines.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Credentials for the auth exchange.
    ///
    /// A missing client ID or secret is sent as an empty string; the server
    /// decides whether that is acceptable.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.client_id.clone().unwrap_or_default(),
            self.client_secret.clone().unwrap_or_default(),
        )
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Scheme-qualified host without a trailing slash.
    ///
    /// # Errors
    /// Returns `ConnectorError::Config` if the host is empty or not a valid
    /// http(s) URL.
    pub fn base_url(&self) -> Result<String> {
        normalize_host(&self.host)
    }

    /// Parsed custom header pairs.
    ///
    /// # Errors
    /// Returns `ConnectorError::InvalidInput` for a line without a name.
    pub fn header_pairs(&self) -> Result<Vec<(String, String)>> {
        self.custom_headers.iter().map(|line| parse_header_line(line)).collect()
    }

    /// Check the configuration without building anything.
    ///
    /// # Errors
    /// Returns the first host or header problem found.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        self.header_pairs()?;
        Ok(())
    }
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("host", &self.host)
            .field("dialect", &self.dialect)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("custom_headers", &self.custom_headers)
            .field("debug", &self.debug)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Normalize a configured host into `<scheme>://<host>[/<path>]`.
///
/// # Errors
/// Returns `ConnectorError::Config` when the result is not a usable http(s)
/// URL.
pub fn normalize_host(host: &str) -> Result<String> {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConnectorError::Config("Host must not be empty".to_string()));
    }

    let lower = trimmed.to_ascii_lowercase();
    let qualified = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&qualified)
        .map_err(|e| ConnectorError::Config(format!("Invalid host '{host}': {e}")))?;
    if parsed.host_str().is_none() {
        return Err(ConnectorError::Config(format!("Host '{host}' has no host name")));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ConnectorError::Config(format!(
            "Host '{host}' must not carry a query or fragment"
        )));
    }

    Ok(qualified)
}

/// Split a raw `Name: value` header line.
///
/// # Errors
/// Returns `ConnectorError::InvalidInput` if the line has no colon or an
/// empty name.
pub fn parse_header_line(line: &str) -> Result<(String, String)> {
    let trimmed = line.trim();
    let (name, value) = trimmed
        .split_once(':')
        .ok_or_else(|| ConnectorError::InvalidInput(format!("Header line without ':': {trimmed}")))?;

    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(ConnectorError::InvalidInput(format!("Invalid header name in: {trimmed}")));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_https_scheme() {
        assert_eq!(normalize_host("api.example.com").unwrap(), "https://api.example.com");
        assert_eq!(normalize_host(" api.example.com/ ").unwrap(), "https://api.example.com");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        assert_eq!(normalize_host("http://localhost:8080/").unwrap(), "http://localhost:8080");
        assert_eq!(
            normalize_host("https://example.com/tenant").unwrap(),
            "https://example.com/tenant"
        );
    }

    #[test]
    fn invalid_hosts_are_rejected() {
        assert!(matches!(normalize_host(""), Err(ConnectorError::Config(_))));
        assert!(matches!(normalize_host("   /"), Err(ConnectorError::Config(_))));
        assert!(matches!(normalize_host("exa mple.com"), Err(ConnectorError::Config(_))));
        assert!(matches!(normalize_host("example.com?x=1"), Err(ConnectorError::Config(_))));
    }

    #[test]
    fn header_lines_are_split_and_trimmed() {
        assert_eq!(
            parse_header_line("  X-Tenant:  acme ").unwrap(),
            ("X-Tenant".to_string(), "acme".to_string())
        );
        assert_eq!(
            parse_header_line("X-Empty:").unwrap(),
            ("X-Empty".to_string(), String::new())
        );
        assert!(parse_header_line("no colon here").is_err());
        assert!(parse_header_line(": value").is_err());
        assert!(parse_header_line("Bad Name: value").is_err());
    }

    #[test]
    fn missing_credentials_become_empty_strings() {
        let config = ConnectorConfig::new("example.com");
        assert_eq!(config.credentials(), Credentials::new("", ""));

        let config = ConnectorConfig { client_id: Some("id".into()), ..config };
        assert_eq!(config.credentials(), Credentials::new("id", ""));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = ConnectorConfig::new("example.com");
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.with_timeout_secs(0).timeout(), None);
    }

    #[test]
    fn deserializes_with_defaults_and_never_serializes_secret() {
        let config: ConnectorConfig = serde_json::from_str(
            r#"{"host": "example.com", "client_id": "id", "client_secret": "secret"}"#,
        )
        .unwrap();

        assert_eq!(config.dialect, Dialect::OAuth2);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(!config.debug);

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret\""));
        assert!(!format!("{config:?}").contains("\"secret\""));
    }
}
