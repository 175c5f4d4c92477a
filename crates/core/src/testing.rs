//! Test doubles for the connector ports
//!
//! [`ScriptedTransport`] replays queued responses and records every request;
//! [`RecordingTokenStore`] counts loads and keeps every saved token.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dynconnect_domain::{
    ConnectorError, Result, TransportError, TransportRequest, TransportResponse,
};
use parking_lot::Mutex;
use serde_json::Value;

use crate::connector::ports::{TokenStore, Transport};

type Reply = std::result::Result<TransportResponse, TransportError>;

/// Transport that answers from a queue.
///
/// Once the queue is empty every call fails with a transport error.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON body with the given status.
    #[must_use]
    pub fn reply_json(self, status: u16, body: Value) -> Self {
        self.replies.lock().push_back(Ok(TransportResponse::new(status, body.to_string())));
        self
    }

    /// Queue a raw body with the given status.
    #[must_use]
    pub fn reply_raw(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.replies.lock().push_back(Ok(TransportResponse::new(status, body)));
        self
    }

    /// Queue a transport-level failure.
    #[must_use]
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.replies.lock().push_back(Err(TransportError::new(message)));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    /// Operation names (URL path after `/api/`) in call order.
    pub fn operations(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|r| r.url.split_once("/api/").map(|(_, op)| op.to_string()).unwrap_or_default())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, request: TransportRequest) -> Reply {
        self.requests.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted response left")))
    }
}

/// Token store that records how it was used.
#[derive(Default)]
pub struct RecordingTokenStore {
    initial: Option<String>,
    loads: AtomicUsize,
    saved: Mutex<Vec<String>>,
    fail_saves: bool,
}

impl RecordingTokenStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self { initial: Some(token.into()), ..Self::default() }
    }

    /// Store whose `save` always fails.
    pub fn failing_saves() -> Self {
        Self { fail_saves: true, ..Self::default() }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saved(&self) -> Vec<String> {
        self.saved.lock().clone()
    }
}

impl TokenStore for RecordingTokenStore {
    fn load(&self) -> Result<Option<String>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.initial.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        self.saved.lock().push(token.to_string());
        if self.fail_saves {
            return Err(ConnectorError::Storage("store is read-only".into()));
        }
        Ok(())
    }
}
