//! # dynconnect Core
//!
//! The request/auth state machine, free of any HTTP or storage code.
//!
//! This crate contains:
//! - Port traits for the transport and token persistence
//! - The JSON codec
//! - Legacy and OAuth2 auth dialects
//! - Dispatcher, auth controller and the `Connector` facade
//!
//! ## Architecture Principles
//! - Only depends on `dynconnect-domain`
//! - All I/O goes through [`Transport`] and [`TokenStore`]
//! - A connector is single-writer: `send` takes `&mut self`

pub mod codec;
pub mod connector;
pub mod token_store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use codec::DecodeError;
pub use connector::auth::{AuthController, AuthOutcome};
pub use connector::dialect::{strategy_for, AuthDialect, LegacySessionDialect, OAuth2Dialect};
pub use connector::dispatcher::Dispatcher;
pub use connector::ports::{TokenStore, Transport};
pub use connector::session::{AuthPhase, SessionState};
pub use connector::trace::{Tracer, TRACE_TARGET};
pub use connector::{Connector, ConnectorBuilder};
pub use token_store::MemoryTokenStore;
