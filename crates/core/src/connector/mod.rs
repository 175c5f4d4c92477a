//! Connector facade
//!
//! Wires configuration, dispatcher, auth controller and tracer together and
//! exposes the caller-facing `send`.
//!
//! A connector holds mutable session state and takes `&mut self` on every
//! call that can change it. Share one across tasks only behind your own lock;
//! one connector per worker is the intended shape.

pub mod auth;
pub mod dialect;
pub mod dispatcher;
pub mod ports;
pub mod session;
pub mod trace;

use std::sync::Arc;

use dynconnect_domain::{
    ApiFailure, ApiResponse, ConnectorConfig, ConnectorError, Dialect, FailureKind, Result,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use self::auth::{AuthController, AuthOutcome};
use self::dialect::strategy_for;
use self::dispatcher::Dispatcher;
use self::ports::{TokenStore, Transport};
use self::session::AuthPhase;
use self::trace::Tracer;
use crate::codec;

/// JSON-over-POST client with automatic re-authentication.
pub struct Connector {
    config: ConnectorConfig,
    dispatcher: Dispatcher,
    auth: AuthController,
    tracer: Tracer,
}

impl Connector {
    /// Build a connector.
    ///
    /// The token store, if any, is asked for its token exactly once, here.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Config` for an unusable host and
    /// `ConnectorError::InvalidInput` for a malformed custom header line.
    pub fn new(
        config: ConnectorConfig,
        transport: Arc<dyn Transport>,
        token_store: Option<Arc<dyn TokenStore>>,
    ) -> Result<Self> {
        let base_url = config.base_url()?;
        let headers = config.header_pairs()?;

        let dispatcher = Dispatcher::new(base_url, headers, config.timeout(), transport);
        let auth = AuthController::new(strategy_for(config.dialect), config.credentials(), token_store);
        let tracer = Tracer::new(config.debug);

        debug!(host = %config.host, dialect = %config.dialect, "Connector created");

        Ok(Self { config, dispatcher, auth, tracer })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ConnectorBuilder {
        ConnectorBuilder::default()
    }

    /// Toggle debug tracing and replace the custom header lines.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::InvalidInput` if a header line is malformed;
    /// the previous settings are kept in that case.
    pub fn configure<I, S>(&mut self, debug: bool, custom_headers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let candidate = self.config.clone().with_custom_headers(custom_headers).with_debug(debug);
        let headers = candidate.header_pairs()?;

        self.dispatcher.set_custom_headers(headers);
        self.tracer = Tracer::new(debug);
        self.config = candidate;
        Ok(())
    }

    /// Send `payload` to `operation`.
    ///
    /// A null payload is sent as `{}`. If the API reports the unauthorized
    /// sentinel, credentials are exchanged for a new token and the call is
    /// repeated once. Every failure comes back as an [`ApiFailure`].
    #[instrument(skip(self, payload), fields(dialect = %self.config.dialect))]
    pub async fn send(&mut self, operation: &str, payload: Value) -> ApiResponse {
        self.auth.send(&self.dispatcher, self.tracer, operation, &payload).await
    }

    /// Typed variant of [`send`](Self::send).
    ///
    /// # Errors
    ///
    /// Besides the failures of `send`, returns
    /// [`FailureKind::InvalidPayload`] if `payload` cannot be represented as
    /// JSON and [`FailureKind::MalformedResponse`] if the success value does
    /// not fit `R`.
    pub async fn send_as<P, R>(
        &mut self,
        operation: &str,
        payload: &P,
    ) -> std::result::Result<R, ApiFailure>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let generic = self.auth.dialect().generic_code();

        let value = codec::to_value(payload).map_err(|e| {
            ApiFailure::new(
                FailureKind::InvalidPayload,
                generic.clone(),
                format!("payload is not representable as JSON: {e}"),
            )
        })?;

        let response = self.send(operation, value).await?;

        codec::from_value(response).map_err(|e| {
            ApiFailure::new(
                FailureKind::MalformedResponse,
                generic,
                format!("malformed response: {e}"),
            )
        })
    }

    /// Run the credential exchange now instead of waiting for an
    /// unauthorized answer.
    pub async fn authenticate(&mut self) -> AuthOutcome {
        self.auth.authenticate(&self.dispatcher, self.tracer).await
    }

    /// Render a failure in the configured dialect's wire shape, e.g.
    /// `{"error": {"code": -1, "reason": "..."}}` for the legacy dialect.
    pub fn render_failure(&self, failure: &ApiFailure) -> Value {
        self.auth.dialect().render_failure(failure)
    }

    /// Current session token, if any
    pub fn token(&self) -> Option<&str> {
        self.auth.session().token()
    }

    pub fn has_token(&self) -> bool {
        self.auth.session().has_token()
    }

    /// `Authenticating` only while an exchange is in flight
    pub fn phase(&self) -> AuthPhase {
        self.auth.phase()
    }

    pub fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    pub fn debug_enabled(&self) -> bool {
        self.tracer.enabled()
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Drop the in-memory token; the next call goes out unauthenticated.
    pub fn clear_token(&mut self) {
        self.auth.clear_token();
    }
}

/// Builder for [`Connector`]
#[derive(Default)]
pub struct ConnectorBuilder {
    config: Option<ConnectorConfig>,
    transport: Option<Arc<dyn Transport>>,
    token_store: Option<Arc<dyn TokenStore>>,
}

impl ConnectorBuilder {
    /// Set the connector configuration
    #[must_use]
    pub fn config(mut self, config: ConnectorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the transport used for every request
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the token store
    #[must_use]
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Build the connector
    ///
    /// # Errors
    ///
    /// Returns error if configuration or transport is missing, or the
    /// configuration is invalid
    pub fn build(self) -> Result<Connector> {
        let config =
            self.config.ok_or_else(|| ConnectorError::Config("Configuration not set".to_string()))?;
        let transport =
            self.transport.ok_or_else(|| ConnectorError::Config("Transport not set".to_string()))?;

        Connector::new(config, transport, self.token_store)
    }
}

#[cfg(test)]
mod tests {
    use dynconnect_domain::ErrorCode;
    use serde_json::json;

    use super::*;
    use crate::testing::{RecordingTokenStore, ScriptedTransport};

    fn oauth_config() -> ConnectorConfig {
        ConnectorConfig::new("api.example.com")
            .with_dialect(Dialect::OAuth2)
            .with_credentials("client", "secret")
    }

    fn legacy_config() -> ConnectorConfig {
        ConnectorConfig::new("api.example.com")
            .with_dialect(Dialect::Legacy)
            .with_credentials("uid", "master")
    }

    fn unauthorized() -> Value {
        json!({"error": "unauthorized", "error_description": "token missing"})
    }

    fn connector(
        config: ConnectorConfig,
        transport: &Arc<ScriptedTransport>,
        store: Option<&Arc<RecordingTokenStore>>,
    ) -> Connector {
        let store = store.map(|s| s.clone() as Arc<dyn TokenStore>);
        Connector::new(config, transport.clone(), store).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_triggers_auth_then_one_retry() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(401, unauthorized())
                .reply_json(200, json!({"access_token": "fresh"}))
                .reply_json(200, json!({"result": "ok"})),
        );
        let store = Arc::new(RecordingTokenStore::empty());
        let mut connector = connector(oauth_config(), &transport, Some(&store));

        let result = connector.send("echo", json!({"a": 1})).await;

        assert_eq!(result, Ok(json!({"result": "ok"})));
        assert_eq!(transport.call_count(), 3);
        assert_eq!(transport.operations(), vec!["echo", "auth/token", "echo"]);
        assert_eq!(store.load_count(), 1);
        assert_eq!(store.saved(), vec!["fresh".to_string()]);
        assert_eq!(connector.token(), Some("fresh"));
        assert_eq!(connector.phase(), AuthPhase::Ready);

        let requests = transport.requests();
        assert_eq!(requests[0].header("Authorization"), None);
        assert_eq!(requests[1].header("Authorization"), None);
        assert_eq!(requests[2].header("Authorization"), Some("Bearer fresh"));
        assert_eq!(
            codec::decode(&requests[1].body).unwrap(),
            json!({"grant_type": "client_credentials", "client_id": "client", "client_secret": "secret"})
        );
        assert_eq!(codec::decode(&requests[2].body).unwrap(), json!({"a": 1}));
    }

    #[tokio::test]
    async fn retry_that_is_unauthorized_again_is_returned_without_another_auth() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(401, unauthorized())
                .reply_json(200, json!({"access_token": "fresh"}))
                .reply_json(401, json!({"error": "unauthorized", "error_description": "still no"})),
        );
        let mut connector = connector(oauth_config(), &transport, None);

        let failure = connector.send("echo", json!({})).await.unwrap_err();

        assert_eq!(transport.call_count(), 3);
        assert_eq!(failure.code, ErrorCode::named("unauthorized"));
        assert_eq!(failure.description, "[401] still no");
        assert_eq!(connector.token(), Some("fresh"));
    }

    #[tokio::test]
    async fn failed_auth_returns_original_failure_and_clears_token() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(401, unauthorized())
                .reply_json(400, json!({"error": "invalid_client", "error_description": "bad secret"})),
        );
        let store = Arc::new(RecordingTokenStore::with_token("stale"));
        let mut connector = connector(oauth_config(), &transport, Some(&store));
        assert_eq!(connector.token(), Some("stale"));

        let failure = connector.send("echo", json!({})).await.unwrap_err();

        assert_eq!(transport.call_count(), 2);
        assert_eq!(failure.code, ErrorCode::named("unauthorized"));
        assert_eq!(failure.description, "[401] token missing");
        assert!(!connector.has_token());
        assert!(store.saved().is_empty());
        assert_eq!(transport.requests()[0].header("Authorization"), Some("Bearer stale"));
    }

    #[tokio::test]
    async fn auth_response_without_token_counts_as_failure() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(200, json!({"error": {"code": 70, "reason": "login required"}}))
                .reply_json(200, json!({"auth": false})),
        );
        let store = Arc::new(RecordingTokenStore::empty());
        let mut connector = connector(legacy_config(), &transport, Some(&store));

        let failure = connector.send("echo", json!({})).await.unwrap_err();

        assert_eq!(transport.call_count(), 2);
        assert_eq!(failure.code, ErrorCode::Numeric(70));
        assert_eq!(failure.description, "login required");
        assert!(store.saved().is_empty());
        assert!(!connector.has_token());
    }

    #[tokio::test]
    async fn application_error_is_returned_after_one_call() {
        let body = json!({"error": "validation", "error_description": "field a missing"});
        let transport = Arc::new(ScriptedTransport::new().reply_json(422, body.clone()));
        let mut connector = connector(oauth_config(), &transport, None);

        let failure = connector.send("echo", json!({})).await.unwrap_err();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(failure.kind, FailureKind::Application);
        assert_eq!(failure.code, ErrorCode::named("validation"));
        assert_eq!(failure.body, Some(body));
    }

    #[tokio::test]
    async fn transport_and_decode_failures_are_not_retried() {
        let transport = Arc::new(
            ScriptedTransport::new().fail("connection refused").reply_raw(200, "").reply_raw(200, "<html>"),
        );
        let mut connector = connector(legacy_config(), &transport, None);

        let transport_failure = connector.send("a", json!({})).await.unwrap_err();
        let empty = connector.send("b", json!({})).await.unwrap_err();
        let malformed = connector.send("c", json!({})).await.unwrap_err();

        assert_eq!(transport.call_count(), 3);
        assert_eq!(transport_failure.kind, FailureKind::Transport);
        assert_eq!(transport_failure.description, "connection refused");
        assert_eq!(empty.description, "empty response");
        assert_eq!(malformed.description, "malformed response");
        assert_eq!(
            connector.render_failure(&empty),
            json!({"error": {"code": -1, "reason": "empty response"}})
        );
    }

    #[tokio::test]
    async fn legacy_session_token_flow() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(200, json!({"error": {"code": 70, "reason": "auth needed"}}))
                .reply_json(200, json!({"auth": true, "session_token": "sess-1"}))
                .reply_json(200, json!({"echo": {"key1": 1}}))
                .reply_json(200, json!({"second": true})),
        );
        let store = Arc::new(RecordingTokenStore::empty());
        let mut connector = connector(legacy_config(), &transport, Some(&store));

        let first = connector.send("test/echo", json!({"key1": 1})).await;
        let second = connector.send("other", Value::Null).await;

        assert_eq!(first, Ok(json!({"echo": {"key1": 1}})));
        assert_eq!(second, Ok(json!({"second": true})));
        assert_eq!(transport.operations(), vec!["test/echo", "auth", "test/echo", "other"]);
        assert_eq!(store.saved(), vec!["sess-1".to_string()]);

        let requests = transport.requests();
        assert_eq!(requests[1].header("Session-Token"), None);
        assert_eq!(
            codec::decode(&requests[1].body).unwrap(),
            json!({"uid": "uid", "master_token": "master"})
        );
        assert_eq!(requests[2].header("Session-Token"), Some("sess-1"));
        assert_eq!(requests[3].header("Session-Token"), Some("sess-1"));
        assert_eq!(requests[3].body, b"{}".to_vec());
    }

    #[tokio::test]
    async fn missing_credentials_still_authenticate_with_empty_strings() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(401, unauthorized())
                .reply_json(200, json!({"access_token": "fresh"}))
                .reply_json(200, json!({"result": "ok"})),
        );
        let mut connector =
            connector(ConnectorConfig::new("api.example.com"), &transport, None);

        let result = connector.send("echo", json!({})).await;

        assert_eq!(result, Ok(json!({"result": "ok"})));
        assert_eq!(transport.call_count(), 3);
        assert_eq!(transport.operations(), vec!["echo", "auth/token", "echo"]);
        assert_eq!(
            codec::decode(&transport.requests()[1].body).unwrap(),
            json!({"grant_type": "client_credentials", "client_id": "", "client_secret": ""})
        );
    }

    #[tokio::test]
    async fn missing_credentials_rejected_by_server_return_original_failure() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(401, unauthorized())
                .reply_json(400, json!({"error": "invalid_client", "error_description": "bad client"})),
        );
        let mut connector =
            connector(ConnectorConfig::new("api.example.com"), &transport, None);

        let failure = connector.send("echo", json!({})).await.unwrap_err();

        assert_eq!(transport.call_count(), 2);
        assert_eq!(failure.code, ErrorCode::named("unauthorized"));
        assert_eq!(transport.operations(), vec!["echo", "auth/token"]);
        assert!(!connector.has_token());
    }

    #[tokio::test]
    async fn store_save_failure_keeps_token_in_memory() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(401, unauthorized())
                .reply_json(200, json!({"access_token": "fresh"}))
                .reply_json(200, json!({"result": "ok"})),
        );
        let store = Arc::new(RecordingTokenStore::failing_saves());
        let mut connector = connector(oauth_config(), &transport, Some(&store));

        assert_eq!(connector.send("echo", json!({})).await, Ok(json!({"result": "ok"})));
        assert_eq!(connector.token(), Some("fresh"));
        assert_eq!(store.saved().len(), 1);
    }

    #[tokio::test]
    async fn explicit_authenticate_and_clear_token() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(200, json!({"access_token": "eager"}))
                .reply_json(200, json!({"ok": 1})),
        );
        let mut connector = connector(oauth_config(), &transport, None);

        assert_eq!(connector.authenticate().await, AuthOutcome::Authenticated);
        assert_eq!(connector.token(), Some("eager"));

        connector.clear_token();
        assert_eq!(connector.send("echo", json!({})).await, Ok(json!({"ok": 1})));
        assert_eq!(transport.requests()[1].header("Authorization"), None);
    }

    #[tokio::test]
    async fn configure_replaces_headers_and_rejects_bad_lines() {
        let transport = Arc::new(
            ScriptedTransport::new().reply_json(200, json!({})).reply_json(200, json!({})),
        );
        let mut connector = connector(oauth_config(), &transport, None);

        connector.configure(true, ["X-Trace: on"]).unwrap();
        assert!(connector.debug_enabled());
        connector.send("one", json!({})).await.unwrap();

        let err = connector.configure(false, ["not a header"]).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidInput(_)));
        assert!(connector.debug_enabled());

        connector.send("two", json!({})).await.unwrap();
        let requests = transport.requests();
        assert_eq!(requests[0].header("X-Trace"), Some("on"));
        assert_eq!(requests[1].header("X-Trace"), Some("on"));
    }

    #[derive(Debug, Serialize)]
    struct EchoRequest {
        key_a: i64,
    }

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct EchoResponse {
        key_a: i64,
    }

    #[tokio::test]
    async fn send_as_round_trips_typed_payloads() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(200, json!({"key_a": 1024}))
                .reply_json(200, json!({"unexpected": true})),
        );
        let mut connector = connector(oauth_config(), &transport, None);

        let echoed: EchoResponse =
            connector.send_as("echo", &EchoRequest { key_a: 1024 }).await.unwrap();
        assert_eq!(echoed, EchoResponse { key_a: 1024 });

        let failure = connector
            .send_as::<_, EchoResponse>("echo", &EchoRequest { key_a: 1 })
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::MalformedResponse);
    }

    #[tokio::test]
    async fn send_as_rejects_unrepresentable_payload_without_sending() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut connector = connector(oauth_config(), &transport, None);

        let mut payload = std::collections::BTreeMap::new();
        payload.insert(vec![1u8], "non-string key");

        let failure = connector.send_as::<_, Value>("echo", &payload).await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::InvalidPayload);
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn builder_requires_config_and_transport() {
        let missing_config = Connector::builder()
            .transport(Arc::new(ScriptedTransport::new()))
            .build();
        assert!(matches!(missing_config, Err(ConnectorError::Config(_))));

        let missing_transport = Connector::builder().config(oauth_config()).build();
        assert!(matches!(missing_transport, Err(ConnectorError::Config(_))));

        let invalid_host = Connector::builder()
            .config(ConnectorConfig::new(""))
            .transport(Arc::new(ScriptedTransport::new()))
            .build();
        assert!(matches!(invalid_host, Err(ConnectorError::Config(_))));
    }

    #[test]
    fn token_store_is_read_once_at_construction() {
        let store = Arc::new(RecordingTokenStore::with_token("persisted"));
        let connector = Connector::builder()
            .config(oauth_config())
            .transport(Arc::new(ScriptedTransport::new()))
            .token_store(store.clone())
            .build()
            .unwrap();

        assert_eq!(store.load_count(), 1);
        assert_eq!(connector.token(), Some("persisted"));
    }
}
