//! Token persisted in a plain file

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dynconnect_core::TokenStore;
use dynconnect_domain::{ConnectorError, Result};
use tracing::debug;

use crate::errors::InfraError;

/// Keeps the session token in a single file.
///
/// A missing or empty (whitespace-only) file means no token. Saving creates
/// parent directories as needed and replaces the file contents.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the token file. Missing files are not an error.
    ///
    /// # Errors
    /// Returns `ConnectorError::Storage` if the file exists and cannot be
    /// removed.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No token file");
                return Ok(None);
            }
            Err(err) => {
                return Err(ConnectorError::Storage(format!(
                    "Failed to read token file {}: {err}",
                    self.path.display()
                )))
            }
        };

        let token = contents.trim();
        debug!(path = %self.path.display(), has_token = !token.is_empty(), "Token file read");
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(InfraError::from)?;
        }

        fs::write(&self.path, token).map_err(|err| {
            ConnectorError::Storage(format!(
                "Failed to write token file {}: {err}",
                self.path.display()
            ))
        })?;

        debug!(path = %self.path.display(), "Token file written");
        Ok(())
    }
}
