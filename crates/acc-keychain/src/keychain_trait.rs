//! Keychain storage abstraction
//!
//! `KeychainStorage` is the seam between the application and the OS secret
//! store. Production code uses the `keyring`-backed [`SystemKeychain`];
//! tests use [`MockKeychain`]. [`CachedKeychain`] wraps either one with a
//! read-through cache so repeated token lookups avoid OS keychain prompts.

use crate::keychain::SystemKeychain;
use acc_types::AppResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Storage interface for secrets, keyed by (service, account)
pub trait KeychainStorage: Send + Sync {
    /// Store a secret, overwriting any existing value
    fn store(&self, service: &str, key: &str, value: &str) -> AppResult<()>;

    /// Retrieve a secret, or `None` if not present
    fn get(&self, service: &str, key: &str) -> AppResult<Option<String>>;

    /// Delete a secret; returns `true` if an entry was removed
    fn delete(&self, service: &str, key: &str) -> AppResult<bool>;
}

/// In-memory keychain for tests
///
/// Never persists anything. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct MockKeychain {
    entries: Arc<RwLock<HashMap<(String, String), String>>>,
}

impl MockKeychain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries (for test assertions)
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeychainStorage for MockKeychain {
    fn store(&self, service: &str, key: &str, value: &str) -> AppResult<()> {
        self.entries
            .write()
            .insert((service.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    fn get(&self, service: &str, key: &str) -> AppResult<Option<String>> {
        Ok(self
            .entries
            .read()
            .get(&(service.to_string(), key.to_string()))
            .cloned())
    }

    fn delete(&self, service: &str, key: &str) -> AppResult<bool> {
        Ok(self
            .entries
            .write()
            .remove(&(service.to_string(), key.to_string()))
            .is_some())
    }
}

/// Keychain facade with a read-through cache
///
/// Wraps a [`KeychainStorage`] backend. Reads hit the in-memory cache first;
/// writes go through to the backend and update the cache. Cloning shares the
/// backend and the cache.
#[derive(Clone)]
pub struct CachedKeychain {
    backend: Arc<dyn KeychainStorage>,
    cache: Arc<RwLock<HashMap<(String, String), String>>>,
}

impl CachedKeychain {
    /// Create a keychain backed by the OS secret store
    pub fn system() -> Self {
        Self::with_backend(Arc::new(SystemKeychain::new()))
    }

    /// Create a keychain backed by an in-memory mock (for tests)
    pub fn mock() -> Self {
        Self::with_backend(Arc::new(MockKeychain::new()))
    }

    /// Create a keychain with a custom backend
    pub fn with_backend(backend: Arc<dyn KeychainStorage>) -> Self {
        Self {
            backend,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store a secret and update the cache
    pub fn store(&self, service: &str, key: &str, value: &str) -> AppResult<()> {
        self.backend.store(service, key, value)?;
        self.cache
            .write()
            .insert((service.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    /// Retrieve a secret, consulting the cache first
    pub fn get(&self, service: &str, key: &str) -> AppResult<Option<String>> {
        let cache_key = (service.to_string(), key.to_string());

        if let Some(value) = self.cache.read().get(&cache_key) {
            return Ok(Some(value.clone()));
        }

        let value = self.backend.get(service, key)?;
        if let Some(ref v) = value {
            debug!("Keychain cache miss for {}/{}", service, key);
            self.cache.write().insert(cache_key, v.clone());
        }

        Ok(value)
    }

    /// Delete a secret from the backend and the cache
    pub fn delete(&self, service: &str, key: &str) -> AppResult<bool> {
        let removed = self.backend.delete(service, key)?;
        self.cache
            .write()
            .remove(&(service.to_string(), key.to_string()));
        Ok(removed)
    }
}
