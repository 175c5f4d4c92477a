//! Human-readable trace lines for the connector's debug mode
//!
//! With debug enabled the lines are emitted at `info` on the
//! `dynconnect::trace` target; otherwise the same events go out at `debug`.
//! Tokens are never logged, only whether one is present.

use dynconnect_domain::ApiFailure;

pub const TRACE_TARGET: &str = "dynconnect::trace";

macro_rules! trace_line {
    ($tracer:expr, $($arg:tt)+) => {
        if $tracer.enabled {
            tracing::info!(target: TRACE_TARGET, $($arg)+);
        } else {
            tracing::debug!(target: TRACE_TARGET, $($arg)+);
        }
    };
}

/// Emits the connector's trace events.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tracer {
    enabled: bool,
}

impl Tracer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(self) -> bool {
        self.enabled
    }

    pub fn send(self, operation: &str) {
        trace_line!(self, operation, "send request");
    }

    pub fn request(self, operation: &str, url: &str, body_len: usize, with_token: bool) {
        trace_line!(self, operation, url, body_len, with_token, "dispatching request");
    }

    pub fn response(self, operation: &str, status: u16, body_len: usize) {
        trace_line!(self, operation, status, body_len, "received response");
    }

    pub fn failure(self, operation: &str, failure: &ApiFailure) {
        trace_line!(
            self,
            operation,
            kind = ?failure.kind,
            code = %failure.code,
            description = %failure.description,
            "request failed"
        );
    }

    pub fn auth_needed(self, operation: &str) {
        trace_line!(self, operation, "authentication needed, trying to log in");
    }

    pub fn auth_done(self, token_len: usize) {
        trace_line!(self, token_len, "authentication done");
    }

    pub fn auth_failed(self, reason: &str) {
        trace_line!(self, reason, "authentication failed");
    }

    pub fn resend(self, operation: &str) {
        trace_line!(self, operation, "resend request");
    }
}
