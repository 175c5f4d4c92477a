//! Domain types and models

pub mod auth;
pub mod response;
pub mod transport;

pub use auth::{Credentials, Dialect};
pub use response::{ApiFailure, ApiResponse, ErrorCode, FailureKind};
pub use transport::{TransportRequest, TransportResponse};
