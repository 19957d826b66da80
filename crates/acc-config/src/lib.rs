//! Configuration management module
//!
//! Handles loading, saving, and validating application configuration:
//! backend endpoint, callback listener port and path, auth flow timeout,
//! and the keychain service name used for token storage.

use acc_types::{AppError, AppResult};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub mod paths;
mod storage;
pub mod types;

pub use storage::{load_config, save_config};
pub use types::AppConfig;

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.backend_base_url.is_empty() {
            return Err(AppError::Config(
                "backend_base_url must not be empty".to_string(),
            ));
        }
        if self.callback_port == 0 {
            return Err(AppError::Config(
                "callback_port must be a concrete port, not 0".to_string(),
            ));
        }
        if !self.callback_path.starts_with('/') {
            return Err(AppError::Config(format!(
                "callback_path must start with '/', got '{}'",
                self.callback_path
            )));
        }
        if self.auth_timeout_secs == 0 {
            return Err(AppError::Config(
                "auth_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Auth flow timeout as a [`Duration`]
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }

    /// Callback listener shutdown grace as a [`Duration`]
    pub fn callback_grace(&self) -> Duration {
        Duration::from_secs(self.callback_grace_secs)
    }

    /// Redirect URI the identity provider navigates to after login
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}{}", self.callback_port, self.callback_path)
    }
}

/// Thread-safe configuration manager
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new(config: AppConfig, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        }
    }

    /// Load configuration from the default location
    pub async fn load() -> AppResult<Self> {
        let config_path = paths::config_file()?;
        Self::load_from_path(config_path).await
    }

    /// Load configuration from a custom path
    pub async fn load_from_path(path: PathBuf) -> AppResult<Self> {
        let config = load_config(&path).await?;
        config.validate()?;
        Ok(Self::new(config, path))
    }

    /// Get a snapshot of the current configuration
    pub fn get(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Apply an update and persist it to disk
    pub async fn update<F>(&self, updater: F) -> AppResult<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut updated = self.config.read().clone();
        updater(&mut updated);
        updated.validate()?;

        *self.config.write() = updated.clone();
        save_config(&updated, &self.config_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let config = AppConfig {
            callback_port: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_callback_path() {
        let config = AppConfig {
            callback_path: "callback".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = AppConfig {
            auth_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_redirect_uri() {
        let config = AppConfig::default();
        assert_eq!(config.redirect_uri(), "http://localhost:3001/callback");
    }

    #[tokio::test]
    async fn test_manager_update_persists() {
        let path = std::env::temp_dir().join(format!(
            "acc-exporter-manager-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let manager = ConfigManager::new(AppConfig::default(), path.clone());

        manager
            .update(|c| c.callback_port = 3777)
            .await
            .unwrap();

        assert_eq!(manager.get().callback_port, 3777);

        let reloaded = ConfigManager::load_from_path(path.clone()).await.unwrap();
        assert_eq!(reloaded.get().callback_port, 3777);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_manager_update_rejects_invalid() {
        let path = std::env::temp_dir().join(format!(
            "acc-exporter-invalid-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let manager = ConfigManager::new(AppConfig::default(), path.clone());

        let result = manager.update(|c| c.auth_timeout_secs = 0).await;
        assert!(result.is_err());

        // Rejected update leaves the in-memory config untouched
        assert_eq!(manager.get().auth_timeout_secs, 600);

        let _ = std::fs::remove_file(&path);
    }
}
