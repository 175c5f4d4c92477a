use std::time::Duration;

use async_trait::async_trait;
use dynconnect_core::Transport;
use dynconnect_domain::{
    ConnectorConfig, ConnectorError, Result, TransportError, TransportRequest, TransportResponse,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client as ReqwestClient;
use tracing::debug;

use crate::errors::{transport_error, InfraError};

const USER_AGENT: &str = concat!("dynconnect/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed [`Transport`].
///
/// Sends exactly one POST per call. Non-2xx responses are returned with their
/// body so the dispatcher can read API error payloads; only failures below
/// HTTP (connect, TLS, timeout) become a [`TransportError`].
#[derive(Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    /// Start building a new transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Config` if the TLS backend cannot be set up.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Transport whose client-wide timeout follows `config.timeout_secs`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn from_config(config: &ConnectorConfig) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

fn header_map(headers: &[(String, String)]) -> std::result::Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::new(format!("invalid header name: {name}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| TransportError::new(format!("invalid value for header {name}")))?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let headers = header_map(&request.headers)?;

        let mut builder = self.client.post(&request.url).headers(headers).body(request.body);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(url = %request.url, "sending HTTP request");

        let response = builder.send().await.map_err(|err| {
            debug!(url = %request.url, error = %err, "HTTP request failed");
            transport_error(err)
        })?;

        let status = response.status().as_u16();
        debug!(url = %request.url, status, "received HTTP response");

        let body = response.bytes().await.map_err(transport_error)?;
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl HttpTransportBuilder {
    /// Client-wide timeout. A per-request timeout on the
    /// [`TransportRequest`] takes precedence.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    #[must_use]
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// # Errors
    ///
    /// Returns `ConnectorError::Config` if the underlying client cannot be
    /// built.
    pub fn build(self) -> Result<HttpTransport> {
        let mut builder = ReqwestClient::builder()
            .no_proxy()
            .user_agent(self.user_agent.unwrap_or_else(|| USER_AGENT.to_string()));

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| ConnectorError::from(InfraError::from(err)))?;

        Ok(HttpTransport { client })
    }
}
