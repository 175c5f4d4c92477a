//! Auth controller
//!
//! Runs one operation, and when the API answers with the dialect's
//! unauthorized sentinel performs a single credential exchange followed by a
//! single retry. The retry is a second straight-line dispatch, not a loop, so
//! a call never makes more than three round trips.

use std::sync::Arc;

use dynconnect_domain::{ApiFailure, ApiResponse, Credentials, FailureKind};
use serde_json::Value;
use tracing::{debug, warn};

use super::dialect::AuthDialect;
use super::dispatcher::Dispatcher;
use super::ports::TokenStore;
use super::session::{AuthPhase, SessionState};
use super::trace::Tracer;

/// Result of an auth exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// A token was issued and stored
    Authenticated,
    /// The exchange ran and did not yield a token
    Rejected(ApiFailure),
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Owns the session token and the dialect used to obtain it.
pub struct AuthController {
    dialect: Box<dyn AuthDialect>,
    credentials: Credentials,
    store: Option<Arc<dyn TokenStore>>,
    session: SessionState,
}

impl AuthController {
    /// Create the controller and read the persisted token once.
    ///
    /// A store that fails to load is logged and treated as holding no token.
    pub fn new(
        dialect: Box<dyn AuthDialect>,
        credentials: Credentials,
        store: Option<Arc<dyn TokenStore>>,
    ) -> Self {
        let initial = store.as_ref().and_then(|store| match store.load() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Failed to load persisted token, starting without one");
                None
            }
        });

        let session = SessionState::with_token(initial);
        debug!(dialect = %dialect.dialect(), has_token = session.has_token(), "Auth controller ready");

        Self { dialect, credentials, store, session }
    }

    pub fn dialect(&self) -> &dyn AuthDialect {
        self.dialect.as_ref()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> AuthPhase {
        self.session.phase()
    }

    /// Forget the in-memory token. The store is left untouched.
    pub fn clear_token(&mut self) {
        self.session.clear();
    }

    /// Send `operation`, re-authenticating and retrying once on the
    /// unauthorized sentinel.
    ///
    /// If the exchange fails the original unauthorized failure is returned.
    /// The retried call's result is returned as-is, whatever it is.
    pub async fn send(
        &mut self,
        dispatcher: &Dispatcher,
        tracer: Tracer,
        operation: &str,
        payload: &Value,
    ) -> ApiResponse {
        tracer.send(operation);

        let response = dispatcher
            .dispatch(self.dialect.as_ref(), operation, payload, self.session.token(), tracer)
            .await;

        let unauthorized = match &response {
            Err(failure) => self.dialect.is_unauthorized(failure),
            Ok(_) => false,
        };
        if !unauthorized {
            return response;
        }

        tracer.auth_needed(operation);
        if !self.authenticate(dispatcher, tracer).await.is_authenticated() {
            return response;
        }

        tracer.resend(operation);
        dispatcher
            .dispatch(self.dialect.as_ref(), operation, payload, self.session.token(), tracer)
            .await
    }

    /// Exchange the configured credentials for a new token.
    ///
    /// On success the token is kept in memory and handed to the store. On
    /// any other outcome the in-memory token is cleared.
    pub async fn authenticate(&mut self, dispatcher: &Dispatcher, tracer: Tracer) -> AuthOutcome {
        self.session.begin_auth();
        let route = self.dialect.auth_route();
        let request = self.dialect.auth_request(&self.credentials);

        let response = dispatcher.dispatch(self.dialect.as_ref(), route, &request, None, tracer).await;

        let token = match response {
            Ok(body) => match self.dialect.extract_token(&body) {
                Some(token) => token,
                None => {
                    let failure = ApiFailure::new(
                        FailureKind::MalformedResponse,
                        self.dialect.generic_code(),
                        "auth response carries no token",
                    );
                    return self.reject(failure, tracer);
                }
            },
            Err(failure) => return self.reject(failure, tracer),
        };

        tracer.auth_done(token.len());
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&token) {
                warn!(error = %err, "Failed to persist new token, keeping it in memory only");
            }
        }
        self.session.authenticated(token);

        AuthOutcome::Authenticated
    }

    fn reject(&mut self, failure: ApiFailure, tracer: Tracer) -> AuthOutcome {
        tracer.auth_failed(&failure.description);
        self.session.auth_failed();
        AuthOutcome::Rejected(failure)
    }
}
