//! Port interfaces for the connector's external collaborators

use async_trait::async_trait;
use dynconnect_domain::{Result, TransportError, TransportRequest, TransportResponse};

/// Performs a single HTTP POST.
///
/// Implementations must return the body for failing statuses as well; only
/// failures below HTTP (connection, TLS, timeout) are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the raw status and body
    async fn post(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// Persists the session token across connector instances.
///
/// `load` is called once, when the connector is built. `save` is called once
/// per successful authentication.
pub trait TokenStore: Send + Sync {
    /// Return the last persisted token, if any
    fn load(&self) -> Result<Option<String>>;

    /// Persist a freshly issued token
    fn save(&self, token: &str) -> Result<()>;
}
