//! Example: echo calls against a live API
//!
//! Sends one unauthenticated echo and, when credentials are configured, one
//! authenticated echo. Debug tracing shows the auth round trip.
//!
//! # Setup
//!
//! ```bash
//! export DYNCONNECT_HOST=api.example.com
//! export DYNCONNECT_CLIENT_ID=...
//! export DYNCONNECT_CLIENT_SECRET=...
//! export DYNCONNECT_DEBUG=true
//! RUST_LOG=info cargo run -p dynconnect-infra --example echo
//! ```
//!
//! The token is kept in `./token` between runs.

use std::sync::Arc;

use dynconnect_infra::{config, connect, FileTokenStore};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = config::load()?;
    let has_credentials = config.client_id.is_some();
    let store = Arc::new(FileTokenStore::new("token"));

    let mut connector = connect(config, Some(store))?;

    println!("Unauthenticated echo");
    match connector.send("test/echo", json!({"key_a": 1024, "key_b": "hello"})).await {
        Ok(value) => println!("  ok: {value}"),
        Err(failure) => println!("  failed: {failure}"),
    }

    if has_credentials {
        println!("Authenticated echo");
        match connector.send("test/echo_auth", json!({"key_a": 2048})).await {
            Ok(value) => println!("  ok: {value}"),
            Err(failure) => {
                println!("  failed: {failure}");
                println!("  wire form: {}", connector.render_failure(&failure));
            }
        }
    } else {
        println!("No DYNCONNECT_CLIENT_ID set, skipping authenticated echo");
    }

    println!("Session has token: {}", connector.has_token());
    Ok(())
}
