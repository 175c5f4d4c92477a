//! Token persisted in the platform keychain
//!
//! macOS Keychain, Windows Credential Manager or the Secret Service on Linux,
//! through `keyring`.

use dynconnect_core::TokenStore;
use dynconnect_domain::{ConnectorError, Result};
use keyring::Entry;
use tracing::debug;

use crate::errors::InfraError;

/// Default keychain service name
pub const DEFAULT_SERVICE: &str = "dynconnect";

/// Keeps the session token in one keychain entry.
///
/// Entries are keyed by service and account; use one account per host so
/// tokens for different APIs do not overwrite each other.
#[derive(Debug, Clone)]
pub struct KeychainTokenStore {
    service: String,
    account: String,
}

impl KeychainTokenStore {
    /// # Arguments
    /// * `service` - Service identifier, e.g. [`DEFAULT_SERVICE`]
    /// * `account` - Entry name, e.g. the API host
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self { service: service.into(), account: account.into() }
    }

    /// Store under [`DEFAULT_SERVICE`] with the host as account.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self::new(DEFAULT_SERVICE, host)
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.account).map_err(|e| InfraError::from(e).into())
    }

    /// Delete the entry (idempotent).
    ///
    /// # Errors
    /// Returns `ConnectorError::Storage` if the keychain cannot be accessed.
    pub fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }
}

impl TokenStore for KeychainTokenStore {
    fn load(&self) -> Result<Option<String>> {
        debug!(service = %self.service, account = %self.account, "Reading token from keychain");

        match self.entry()?.get_password() {
            Ok(token) if token.is_empty() => Ok(None),
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        debug!(service = %self.service, account = %self.account, "Storing token in keychain");

        self.entry()?.set_password(token).map_err(|e| {
            ConnectorError::Storage(format!(
                "Failed to store token for {}: {}",
                self.account,
                ConnectorError::from(InfraError::from(e))
            ))
        })
    }
}
