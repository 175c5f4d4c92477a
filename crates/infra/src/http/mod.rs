//! HTTP transport

pub mod transport;

pub use transport::{HttpTransport, HttpTransportBuilder};
