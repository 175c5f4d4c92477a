//! Persistent token stores
//!
//! Implementations of the core `TokenStore` port. The in-memory store lives
//! in `dynconnect-core`.

pub mod file;
#[cfg(feature = "keychain")]
pub mod keychain;

pub use file::FileTokenStore;
#[cfg(feature = "keychain")]
pub use keychain::KeychainTokenStore;
