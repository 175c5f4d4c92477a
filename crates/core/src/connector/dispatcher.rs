//! Request dispatcher
//!
//! Builds the outbound request, runs it through the transport and turns
//! every possible outcome into an [`ApiResponse`]. Nothing escapes as an
//! error of another type.

use std::sync::Arc;
use std::time::Duration;

use dynconnect_domain::constants::{
    API_PREFIX, CONTENT_TYPE_HEADER, CONTENT_TYPE_JSON, GENERAL_CONNECTION_ERROR,
};
use dynconnect_domain::{
    ApiFailure, ApiResponse, FailureKind, TransportRequest, TransportResponse,
};
use serde_json::{Map, Value};

use super::dialect::AuthDialect;
use super::ports::Transport;
use super::trace::Tracer;
use crate::codec::{self, DecodeError};

/// Sends one operation to the configured host.
pub struct Dispatcher {
    base_url: String,
    custom_headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    /// `base_url` must already be normalized (scheme, no trailing slash).
    pub fn new(
        base_url: impl Into<String>,
        custom_headers: Vec<(String, String)>,
        timeout: Option<Duration>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self { base_url: base_url.into(), custom_headers, timeout, transport }
    }

    pub fn url_for(&self, operation: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_PREFIX, operation.trim_start_matches('/'))
    }

    pub(crate) fn set_custom_headers(&mut self, headers: Vec<(String, String)>) {
        self.custom_headers = headers;
    }

    /// Assemble the POST for `operation`.
    ///
    /// The token header is added only when a token is present and the
    /// operation is not the dialect's auth route. A null payload is sent as
    /// `{}`.
    pub fn build_request(
        &self,
        dialect: &dyn AuthDialect,
        operation: &str,
        payload: &Value,
        token: Option<&str>,
    ) -> TransportRequest {
        let mut headers =
            vec![(CONTENT_TYPE_HEADER.to_string(), CONTENT_TYPE_JSON.to_string())];

        if let Some(token) = token.filter(|_| !dialect.is_auth_route(operation)) {
            headers.push(dialect.token_header(token));
        }

        headers.extend(self.custom_headers.iter().cloned());

        let body = if payload.is_null() {
            codec::encode(&Value::Object(Map::new()))
        } else {
            codec::encode(payload)
        };

        TransportRequest { url: self.url_for(operation), headers, body, timeout: self.timeout }
    }

    /// Send `operation` and normalize the outcome.
    pub async fn dispatch(
        &self,
        dialect: &dyn AuthDialect,
        operation: &str,
        payload: &Value,
        token: Option<&str>,
        tracer: Tracer,
    ) -> ApiResponse {
        let with_token = token.is_some() && !dialect.is_auth_route(operation);
        let request = self.build_request(dialect, operation, payload, token);
        tracer.request(operation, &request.url, request.body.len(), with_token);

        let result = match self.transport.post(request).await {
            Ok(response) => {
                tracer.response(operation, response.status, response.body.len());
                interpret(dialect, &response)
            }
            Err(err) => {
                let description = if err.message().trim().is_empty() {
                    GENERAL_CONNECTION_ERROR.to_string()
                } else {
                    err.message().to_string()
                };
                Err(ApiFailure::new(FailureKind::Transport, dialect.generic_code(), description))
            }
        };

        if let Err(failure) = &result {
            tracer.failure(operation, failure);
        }
        result
    }
}

/// Map a raw response onto success or a structured failure.
///
/// A JSON error body wins over the HTTP status. A failing status without one
/// becomes a transport failure. On non-failing statuses an undecodable body
/// is reported as empty or malformed.
pub fn interpret(dialect: &dyn AuthDialect, response: &TransportResponse) -> ApiResponse {
    let status = response.status;
    let failing = response.is_failure_status();

    match codec::decode(&response.body) {
        Ok(value) => {
            if let Some((code, description)) = dialect.parse_error(&value) {
                let description =
                    if failing { format!("[{status}] {description}") } else { description };
                return Err(ApiFailure::application(code, description, value).with_status(status));
            }
            if failing {
                return Err(status_failure(dialect, status));
            }
            Ok(value)
        }
        Err(_) if failing => Err(status_failure(dialect, status)),
        Err(err) => {
            let kind = match err {
                DecodeError::Empty => FailureKind::EmptyResponse,
                DecodeError::Malformed(_) => FailureKind::MalformedResponse,
            };
            Err(ApiFailure::new(kind, dialect.generic_code(), err.description()).with_status(status))
        }
    }
}

fn status_failure(dialect: &dyn AuthDialect, status: u16) -> ApiFailure {
    ApiFailure::new(FailureKind::Transport, dialect.generic_code(), format!("HTTP status {status}"))
        .with_status(status)
}
