//! # dynconnect Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The reqwest-backed HTTP transport
//! - Configuration loading from environment and files
//! - File and keychain token stores
//! - Error conversions from external crates
//!
//! ## Architecture
//! - Implements traits defined in `dynconnect-core`
//! - Contains all "impure" code (network, filesystem, keychain)

pub mod config;
pub mod errors;
pub mod http;
pub mod token_store;

use std::sync::Arc;

use dynconnect_core::{Connector, TokenStore};
use dynconnect_domain::{ConnectorConfig, Result};

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpTransport, HttpTransportBuilder};
pub use token_store::FileTokenStore;
#[cfg(feature = "keychain")]
pub use token_store::KeychainTokenStore;

/// Build a connector that talks HTTP(S) through [`HttpTransport`].
///
/// # Errors
///
/// Returns `ConnectorError::Config` for an unusable host or HTTP client and
/// `ConnectorError::InvalidInput` for a malformed custom header line.
pub fn connect(
    config: ConnectorConfig,
    token_store: Option<Arc<dyn TokenStore>>,
) -> Result<Connector> {
    config.validate()?;
    let transport = HttpTransport::from_config(&config)?;
    Connector::new(config, Arc::new(transport), token_store)
}

/// [`connect`] with configuration from [`config::load`].
///
/// # Errors
///
/// Same as [`config::load`] and [`connect`].
pub fn connect_from_environment(token_store: Option<Arc<dyn TokenStore>>) -> Result<Connector> {
    connect(config::load()?, token_store)
}
