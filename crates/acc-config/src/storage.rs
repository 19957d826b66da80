//! Configuration file loading and saving

use crate::paths::ensure_dir_exists;
use crate::types::AppConfig;
use acc_types::{AppError, AppResult};
use std::path::Path;
use tracing::{debug, info};

/// Load configuration from a TOML file
///
/// Returns the default configuration if the file does not exist yet.
pub async fn load_config(path: &Path) -> AppResult<AppConfig> {
    if !path.exists() {
        info!(
            "No configuration file at {}, using defaults",
            path.display()
        );
        return Ok(AppConfig::default());
    }

    let contents = tokio::fs::read_to_string(path).await?;
    let config: AppConfig = toml::from_str(&contents)
        .map_err(|e| AppError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Save configuration to a TOML file, creating parent directories as needed
pub async fn save_config(config: &AppConfig, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(&parent.to_path_buf())?;
    }

    let contents = toml::to_string_pretty(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize configuration: {}", e)))?;
    tokio::fs::write(path, contents).await?;

    debug!("Saved configuration to {}", path.display());
    Ok(())
}
