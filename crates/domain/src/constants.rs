//! Wire-level constants
//!
//! Routes, sentinels and header names shared by both auth dialects.

/// Path segment placed between the host and the operation.
pub const API_PREFIX: &str = "api";

// Legacy session-token dialect
pub const LEGACY_AUTH_ROUTE: &str = "auth";
pub const LEGACY_UNAUTHORIZED_CODE: i64 = 70;
pub const LEGACY_GENERIC_CODE: i64 = -1;
pub const SESSION_TOKEN_HEADER: &str = "Session-Token";

// OAuth2 client-credentials dialect
pub const OAUTH2_TOKEN_ROUTE: &str = "auth/token";
pub const OAUTH2_UNAUTHORIZED: &str = "unauthorized";
pub const OAUTH2_GENERIC_ERROR: &str = "general";
pub const OAUTH2_GRANT_TYPE: &str = "client_credentials";
pub const AUTHORIZATION_HEADER: &str = "Authorization";

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

// Synthetic failure descriptions
pub const EMPTY_RESPONSE: &str = "empty response";
pub const MALFORMED_RESPONSE: &str = "malformed response";
pub const GENERAL_CONNECTION_ERROR: &str = "general connection error";

/// Per-request timeout when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
