//! Session state owned by a connector

use std::fmt;

/// Where the auth controller is in its cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthPhase {
    /// Not mid-exchange; may or may not hold a token
    #[default]
    Ready,
    /// Only while the nested auth-exchange call is in flight
    Authenticating,
}

/// The current token and auth phase.
///
/// Mutated only by the auth controller. There is no internal locking; a
/// connector is meant to be driven by one caller at a time.
#[derive(Default)]
pub struct SessionState {
    token: Option<String>,
    phase: AuthPhase,
}

impl SessionState {
    /// Start from a persisted token; empty strings count as no token.
    pub fn with_token(token: Option<String>) -> Self {
        Self { token: token.filter(|t| !t.is_empty()), phase: AuthPhase::Ready }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub(crate) fn begin_auth(&mut self) {
        self.phase = AuthPhase::Authenticating;
    }

    pub(crate) fn authenticated(&mut self, token: String) {
        self.token = Some(token);
        self.phase = AuthPhase::Ready;
    }

    pub(crate) fn auth_failed(&mut self) {
        self.token = None;
        self.phase = AuthPhase::Ready;
    }

    pub(crate) fn clear(&mut self) {
        self.token = None;
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("has_token", &self.has_token())
            .field("phase", &self.phase)
            .finish()
    }
}
