//! Configuration loader
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `DYNCONNECT_HOST` is missing or a value is invalid, falls back to
//!    loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `DYNCONNECT_HOST`: API host, with or without scheme (required)
//! - `DYNCONNECT_DIALECT`: `legacy` or `oauth2` (default `oauth2`)
//! - `DYNCONNECT_CLIENT_ID`: Client ID or auth UID
//! - `DYNCONNECT_CLIENT_SECRET`: Client secret or master token
//! - `DYNCONNECT_HEADERS`: Extra `Name: value` lines, separated by newlines
//!   or `;`
//! - `DYNCONNECT_DEBUG`: Trace requests at info level (true/false)
//! - `DYNCONNECT_TIMEOUT_SECS`: Per-request timeout, `0` disables it
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./dynconnect.json` or `./dynconnect.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use dynconnect_domain::constants::DEFAULT_TIMEOUT_SECS;
use dynconnect_domain::{ConnectorConfig, ConnectorError, Dialect, Result};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] =
    ["dynconnect.json", "dynconnect.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables, then from a config
/// file. The result is validated before it is returned.
///
/// # Errors
/// Returns `ConnectorError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The host is missing or unusable
pub fn load() -> Result<ConnectorConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `DYNCONNECT_HOST` is required.
///
/// # Errors
/// Returns `ConnectorError::Config` if the host is missing or a value cannot
/// be parsed, and `ConnectorError::InvalidInput` for a malformed header line.
pub fn load_from_env() -> Result<ConnectorConfig> {
    let host = env_var("DYNCONNECT_HOST")?;

    let dialect = match optional_env_var("DYNCONNECT_DIALECT") {
        Some(value) => value.parse::<Dialect>()?,
        None => Dialect::default(),
    };

    let timeout_secs = match optional_env_var("DYNCONNECT_TIMEOUT_SECS") {
        Some(value) => value.trim().parse::<u64>().map_err(|e| {
            ConnectorError::Config(format!("Invalid timeout: {e}"))
        })?,
        None => DEFAULT_TIMEOUT_SECS,
    };

    let custom_headers =
        optional_env_var("DYNCONNECT_HEADERS").map(|raw| split_header_lines(&raw)).unwrap_or_default();

    let config = ConnectorConfig {
        host,
        dialect,
        client_id: optional_env_var("DYNCONNECT_CLIENT_ID"),
        client_secret: optional_env_var("DYNCONNECT_CLIENT_SECRET"),
        custom_headers,
        debug: env_bool("DYNCONNECT_DEBUG", false),
        timeout_secs,
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected by
/// file extension.
///
/// # Errors
/// Returns `ConnectorError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or the result fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ConnectorConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConnectorError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConnectorError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConnectorError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// # Errors
/// Returns `ConnectorError::Config` if the format is unsupported or parsing
/// fails.
fn parse_config(contents: &str, path: &Path) -> Result<ConnectorConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents).map_err(|e| InfraError::from(e).into()),
        _ => Err(ConnectorError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// Checks the current working directory first, then the directory of the
/// running executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.is_file())
}

/// Split a `DYNCONNECT_HEADERS` value into header lines.
fn split_header_lines(raw: &str) -> Vec<String> {
    raw.split(['\n', ';'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `ConnectorError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    optional_env_var(key).ok_or_else(|| {
        ConnectorError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn optional_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
