//! OS-specific path resolution for configuration files

use acc_types::{AppError, AppResult};
use std::path::PathBuf;

/// Get the configuration directory
///
/// Priority:
/// 1. Runtime override via `ACC_EXPORTER_ENV` environment variable: `~/.acc-exporter-{env}/`
/// 2. Development mode (debug builds): `~/.acc-exporter-dev/`
/// 3. Production mode (release builds): `~/.acc-exporter/`
pub fn config_dir() -> AppResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AppError::Config("Could not determine home directory".to_string()))?;

    // Runtime override via environment variable (for testing)
    if let Ok(env_suffix) = std::env::var("ACC_EXPORTER_ENV") {
        return Ok(home.join(format!(".acc-exporter-{}", env_suffix)));
    }

    #[cfg(debug_assertions)]
    let dir = home.join(".acc-exporter-dev");

    #[cfg(not(debug_assertions))]
    let dir = home.join(".acc-exporter");

    Ok(dir)
}

/// Get the configuration file path
pub fn config_file() -> AppResult<PathBuf> {
    Ok(config_dir()?.join("settings.toml"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir_exists(path: &PathBuf) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_config_dir() {
        env::remove_var("ACC_EXPORTER_ENV");

        let dir = config_dir().unwrap();
        assert!(!dir.as_os_str().is_empty());

        #[cfg(debug_assertions)]
        assert!(dir.to_string_lossy().ends_with(".acc-exporter-dev"));

        #[cfg(not(debug_assertions))]
        assert!(dir.to_string_lossy().ends_with(".acc-exporter"));
    }

    #[test]
    #[serial]
    fn test_config_dir_with_env_override() {
        env::set_var("ACC_EXPORTER_ENV", "test");

        let dir = config_dir().unwrap();
        assert!(
            dir.to_string_lossy().ends_with(".acc-exporter-test"),
            "Expected path to end with .acc-exporter-test, got: {}",
            dir.display()
        );

        env::remove_var("ACC_EXPORTER_ENV");
    }

    #[test]
    #[serial]
    fn test_config_file() {
        env::remove_var("ACC_EXPORTER_ENV");

        let file = config_file().unwrap();
        assert!(file.to_string_lossy().ends_with("settings.toml"));
    }
}
