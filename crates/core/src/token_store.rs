//! In-process token store

use dynconnect_domain::Result;
use parking_lot::Mutex;

use crate::connector::ports::TokenStore;

/// Keeps the token in memory, e.g. to share it between connectors of one
/// process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Mutex::new(Some(token.into())) }
    }

    pub fn current(&self) -> Option<String> {
        self.token.lock().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.current())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }
}
