//! Configuration types

use serde::{Deserialize, Serialize};

/// Application configuration
///
/// Serialized as TOML in the settings file. Every field has a default so a
/// missing or partial file still yields a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Base URL of the exporter backend API
    #[serde(default = "default_backend_base_url")]
    pub backend_base_url: String,

    /// Local port the OAuth callback listener binds to
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,

    /// Path component of the OAuth callback endpoint
    #[serde(default = "default_callback_path")]
    pub callback_path: String,

    /// How long an authentication attempt may stay open, in seconds
    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,

    /// Grace period before the callback listener shuts down after a
    /// successful callback, so the browser response can flush
    #[serde(default = "default_callback_grace_secs")]
    pub callback_grace_secs: u64,

    /// Keychain service name under which tokens are stored
    #[serde(default = "default_keychain_service")]
    pub keychain_service: String,
}

fn default_backend_base_url() -> String {
    "http://localhost:5188/api".to_string()
}

fn default_callback_port() -> u16 {
    3001
}

fn default_callback_path() -> String {
    "/callback".to_string()
}

fn default_auth_timeout_secs() -> u64 {
    600
}

fn default_callback_grace_secs() -> u64 {
    2
}

fn default_keychain_service() -> String {
    "acc-exporter".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_base_url: default_backend_base_url(),
            callback_port: default_callback_port(),
            callback_path: default_callback_path(),
            auth_timeout_secs: default_auth_timeout_secs(),
            callback_grace_secs: default_callback_grace_secs(),
            keychain_service: default_keychain_service(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.callback_port, 3001);
        assert_eq!(config.callback_path, "/callback");
        assert_eq!(config.auth_timeout_secs, 600);
        assert_eq!(config.keychain_service, "acc-exporter");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("callback_port = 4100").unwrap();

        assert_eq!(config.callback_port, 4100);
        assert_eq!(config.auth_timeout_secs, 600);
        assert_eq!(config.backend_base_url, "http://localhost:5188/api");
    }

    #[test]
    fn test_roundtrip() {
        let config = AppConfig {
            callback_port: 3099,
            ..AppConfig::default()
        };

        let text = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed, config);
    }
}
