//! Auth dialect strategies
//!
//! The legacy session-token protocol and the OAuth2 client-credentials
//! protocol differ in their auth route, token header, credential payload,
//! error body shape and unauthorized sentinel. Each is captured by one
//! [`AuthDialect`] implementation selected from configuration.

use std::fmt::Debug;

use dynconnect_domain::constants::{
    AUTHORIZATION_HEADER, LEGACY_AUTH_ROUTE, LEGACY_GENERIC_CODE, LEGACY_UNAUTHORIZED_CODE,
    OAUTH2_GENERIC_ERROR, OAUTH2_GRANT_TYPE, OAUTH2_TOKEN_ROUTE, OAUTH2_UNAUTHORIZED,
    SESSION_TOKEN_HEADER,
};
use dynconnect_domain::{ApiFailure, Credentials, Dialect, ErrorCode};
use serde_json::{json, Value};

/// Protocol-specific behaviour of the auth exchange.
pub trait AuthDialect: Send + Sync + Debug {
    /// Which dialect this strategy implements
    fn dialect(&self) -> Dialect;

    /// Operation that exchanges credentials for a token
    fn auth_route(&self) -> &'static str;

    /// Header carrying the token on authorized requests
    fn token_header(&self, token: &str) -> (String, String);

    /// Body of the auth exchange request
    fn auth_request(&self, credentials: &Credentials) -> Value;

    /// Token issued by a successful auth exchange
    fn extract_token(&self, response: &Value) -> Option<String>;

    /// Code used for failures the connector synthesizes
    fn generic_code(&self) -> ErrorCode;

    /// Code the API uses to say the token is missing or invalid
    fn unauthorized_code(&self) -> ErrorCode;

    /// Error code and description, if `body` is an error response
    fn parse_error(&self, body: &Value) -> Option<(ErrorCode, String)>;

    /// Render a failure in this dialect's wire shape
    fn render_failure(&self, failure: &ApiFailure) -> Value;

    fn is_auth_route(&self, operation: &str) -> bool {
        operation.trim_matches('/') == self.auth_route()
    }

    fn is_unauthorized(&self, failure: &ApiFailure) -> bool {
        failure.is_application() && failure.code == self.unauthorized_code()
    }
}

/// Strategy for the configured dialect.
pub fn strategy_for(dialect: Dialect) -> Box<dyn AuthDialect> {
    match dialect {
        Dialect::Legacy => Box::new(LegacySessionDialect),
        Dialect::OAuth2 => Box::new(OAuth2Dialect),
    }
}

/// `uid` + `master_token` → `session_token`, sent back as `Session-Token`.
///
/// Errors look like `{"error": {"code": 70, "reason": "..."}}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacySessionDialect;

impl AuthDialect for LegacySessionDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Legacy
    }

    fn auth_route(&self) -> &'static str {
        LEGACY_AUTH_ROUTE
    }

    fn token_header(&self, token: &str) -> (String, String) {
        (SESSION_TOKEN_HEADER.to_string(), token.to_string())
    }

    fn auth_request(&self, credentials: &Credentials) -> Value {
        json!({
            "uid": credentials.client_id,
            "master_token": credentials.client_secret,
        })
    }

    fn extract_token(&self, response: &Value) -> Option<String> {
        if !response.get("auth").is_some_and(is_truthy) {
            return None;
        }
        non_empty_string(response.get("session_token"))
    }

    fn generic_code(&self) -> ErrorCode {
        ErrorCode::Numeric(LEGACY_GENERIC_CODE)
    }

    fn unauthorized_code(&self) -> ErrorCode {
        ErrorCode::Numeric(LEGACY_UNAUTHORIZED_CODE)
    }

    fn parse_error(&self, body: &Value) -> Option<(ErrorCode, String)> {
        match body.get("error")? {
            Value::Null => None,
            Value::Object(error) => {
                let code = error
                    .get("code")
                    .and_then(numeric_code)
                    .map_or_else(|| self.generic_code(), ErrorCode::Numeric);
                let reason = error.get("reason").map(describe).unwrap_or_default();
                Some((code, reason))
            }
            other => Some((self.generic_code(), describe(other))),
        }
    }

    fn render_failure(&self, failure: &ApiFailure) -> Value {
        if let Some(body) = failure.body.as_ref().filter(|_| failure.is_application()) {
            return body.clone();
        }
        let code = failure.code.as_i64().unwrap_or(LEGACY_GENERIC_CODE);
        json!({"error": {"code": code, "reason": failure.description}})
    }
}

/// OAuth2 client-credentials grant against `auth/token`, bearer token.
///
/// Errors look like `{"error": "unauthorized", "error_description": "..."}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OAuth2Dialect;

impl AuthDialect for OAuth2Dialect {
    fn dialect(&self) -> Dialect {
        Dialect::OAuth2
    }

    fn auth_route(&self) -> &'static str {
        OAUTH2_TOKEN_ROUTE
    }

    fn token_header(&self, token: &str) -> (String, String) {
        (AUTHORIZATION_HEADER.to_string(), format!("Bearer {token}"))
    }

    fn auth_request(&self, credentials: &Credentials) -> Value {
        json!({
            "grant_type": OAUTH2_GRANT_TYPE,
            "client_id": credentials.client_id,
            "client_secret": credentials.client_secret,
        })
    }

    fn extract_token(&self, response: &Value) -> Option<String> {
        non_empty_string(response.get("access_token"))
    }

    fn generic_code(&self) -> ErrorCode {
        ErrorCode::named(OAUTH2_GENERIC_ERROR)
    }

    fn unauthorized_code(&self) -> ErrorCode {
        ErrorCode::named(OAUTH2_UNAUTHORIZED)
    }

    fn parse_error(&self, body: &Value) -> Option<(ErrorCode, String)> {
        let description = body.get("error_description").map(describe).unwrap_or_default();
        match body.get("error")? {
            Value::Null => None,
            Value::String(error) => Some((ErrorCode::Named(error.clone()), description)),
            other => Some((self.generic_code(), describe(other))),
        }
    }

    fn render_failure(&self, failure: &ApiFailure) -> Value {
        if let Some(body) = failure.body.as_ref().filter(|_| failure.is_application()) {
            return body.clone();
        }
        json!({"error": failure.code.to_string(), "error_description": failure.description})
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Integer code, also when the server sends it as a numeric string.
fn numeric_code(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_i64(),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
