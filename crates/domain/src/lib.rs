//! # dynconnect Domain
//!
//! Data types shared by every dynconnect crate.
//!
//! This crate contains:
//! - Connector error types and the `Result` alias
//! - The per-request response union (`ApiFailure`, `ErrorCode`)
//! - Auth dialect and credential types
//! - Transport request/response values
//! - Connector configuration and wire constants
//!
//! ## Architecture
//! - No dependencies on other dynconnect crates
//! - No I/O; pure data and validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
