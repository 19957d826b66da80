//! OS keychain backend
//!
//! Stores secrets in the platform secret store (macOS Keychain, Windows
//! Credential Manager, Linux keyutils/secret-service) via the `keyring` crate.

use crate::keychain_trait::KeychainStorage;
use acc_types::{AppError, AppResult};
use keyring::Entry;
use tracing::{debug, warn};

/// Keychain storage backed by the OS secret store
#[derive(Default)]
pub struct SystemKeychain;

impl SystemKeychain {
    pub fn new() -> Self {
        Self
    }

    fn entry(service: &str, key: &str) -> AppResult<Entry> {
        Entry::new(service, key)
            .map_err(|e| AppError::Keychain(format!("Failed to open keychain entry: {}", e)))
    }
}

impl KeychainStorage for SystemKeychain {
    fn store(&self, service: &str, key: &str, value: &str) -> AppResult<()> {
        let entry = Self::entry(service, key)?;
        entry
            .set_password(value)
            .map_err(|e| AppError::Keychain(format!("Failed to store secret: {}", e)))?;
        debug!("Stored secret for {}/{}", service, key);
        Ok(())
    }

    fn get(&self, service: &str, key: &str) -> AppResult<Option<String>> {
        let entry = Self::entry(service, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => {
                warn!("Keychain read failed for {}/{}: {}", service, key, e);
                Err(AppError::Keychain(format!("Failed to read secret: {}", e)))
            }
        }
    }

    fn delete(&self, service: &str, key: &str) -> AppResult<bool> {
        let entry = Self::entry(service, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(AppError::Keychain(format!("Failed to delete secret: {}", e))),
        }
    }
}
