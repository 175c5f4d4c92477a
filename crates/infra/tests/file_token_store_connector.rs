//! File-backed token persistence driven through a scripted transport.

use std::fs;
use std::sync::Arc;

use dynconnect_core::testing::ScriptedTransport;
use dynconnect_core::{Connector, TokenStore};
use dynconnect_domain::{ConnectorConfig, Dialect};
use dynconnect_infra::FileTokenStore;
use serde_json::json;
use tempfile::TempDir;

fn legacy_config() -> ConnectorConfig {
    ConnectorConfig::new("api.example.com")
        .with_dialect(Dialect::Legacy)
        .with_credentials("uid", "master")
}

#[tokio::test]
async fn stored_token_is_sent_without_authenticating() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("token");
    fs::write(&path, "sess-saved\n").unwrap();

    let transport = Arc::new(ScriptedTransport::new().reply_json(200, json!({"ok": true})));
    let store = Arc::new(FileTokenStore::new(&path));
    let mut connector = Connector::new(legacy_config(), transport.clone(), Some(store)).unwrap();

    assert_eq!(connector.token(), Some("sess-saved"));
    let result = connector.send("status", json!({})).await;

    assert_eq!(result, Ok(json!({"ok": true})));
    assert_eq!(transport.operations(), vec!["status"]);
    assert_eq!(transport.requests()[0].header("Session-Token"), Some("sess-saved"));
}

#[tokio::test]
async fn rejected_stored_token_is_replaced_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("token");
    fs::write(&path, "sess-stale").unwrap();

    let transport = Arc::new(
        ScriptedTransport::new()
            .reply_json(200, json!({"error": {"code": 70, "reason": "session expired"}}))
            .reply_json(200, json!({"auth": true, "session_token": "sess-new"}))
            .reply_json(200, json!({"ok": true})),
    );
    let store = Arc::new(FileTokenStore::new(&path));
    let mut connector =
        Connector::new(legacy_config(), transport.clone(), Some(store.clone())).unwrap();

    let result = connector.send("status", json!({})).await;

    assert_eq!(result, Ok(json!({"ok": true})));
    assert_eq!(transport.operations(), vec!["status", "auth", "status"]);
    let requests = transport.requests();
    assert_eq!(requests[0].header("Session-Token"), Some("sess-stale"));
    assert_eq!(requests[2].header("Session-Token"), Some("sess-new"));
    assert_eq!(store.load().unwrap().as_deref(), Some("sess-new"));
}
