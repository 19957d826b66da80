//! Keychain storage module
//!
//! Provides keychain storage functionality for securely storing secrets.
//! The auth and backend modules use this to persist ACC access tokens.

mod keychain;
pub mod keychain_trait;

pub use keychain::SystemKeychain;
pub use keychain_trait::{CachedKeychain, KeychainStorage, MockKeychain};
