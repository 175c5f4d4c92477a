//! Shared fixtures for the wiremock-backed connector tests.

#![allow(dead_code)]

use std::sync::Once;

use dynconnect_domain::{ConnectorConfig, Dialect};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";

/// Install a test subscriber once per binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn oauth_config(server: &MockServer) -> ConnectorConfig {
    ConnectorConfig::new(server.uri())
        .with_dialect(Dialect::OAuth2)
        .with_credentials(CLIENT_ID, CLIENT_SECRET)
}

pub fn legacy_config(server: &MockServer) -> ConnectorConfig {
    ConnectorConfig::new(server.uri())
        .with_dialect(Dialect::Legacy)
        .with_credentials(CLIENT_ID, CLIENT_SECRET)
}

pub fn oauth_unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "error": "unauthorized",
        "error_description": "Full authentication is required"
    }))
}

pub fn legacy_unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"error": {"code": 70, "reason": "session token required"}}))
}

/// Token endpoint that issues `token` for the test credentials, `expected`
/// times.
pub async fn mount_oauth_token(server: &MockServer, token: &str, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/api/auth/token"))
        .and(body_json(json!({
            "grant_type": "client_credentials",
            "client_id": CLIENT_ID,
            "client_secret": CLIENT_SECRET
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(expected)
        .mount(server)
        .await;
}

/// Legacy auth endpoint that issues `token`, `expected` times.
pub async fn mount_legacy_auth(server: &MockServer, token: &str, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(body_json(json!({"uid": CLIENT_ID, "master_token": CLIENT_SECRET})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"auth": true, "session_token": token})),
        )
        .expect(expected)
        .mount(server)
        .await;
}

/// `operation` answers `body` when the bearer token matches and the
/// unauthorized sentinel otherwise.
pub async fn mount_bearer_protected(
    server: &MockServer,
    operation: &str,
    token: &str,
    body: Value,
    authorized_calls: u64,
    unauthorized_calls: u64,
) {
    let route = format!("/api/{operation}");

    Mock::given(method("POST"))
        .and(path(route.as_str()))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .with_priority(1)
        .expect(authorized_calls)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(route.as_str()))
        .respond_with(oauth_unauthorized())
        .expect(unauthorized_calls)
        .mount(server)
        .await;
}
