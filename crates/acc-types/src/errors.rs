//! Error types and conversions

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Auth flow error: {0}")]
    AuthFlow(String),

    #[error("Failed to bind callback port {port}: {message}")]
    CallbackBind { port: u16, message: String },

    #[error("An authentication attempt is already in progress")]
    AttemptInProgress,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_bind_display() {
        let err = AppError::CallbackBind {
            port: 3001,
            message: "address in use".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("3001"));
        assert!(text.contains("address in use"));
    }

    #[test]
    fn test_error_to_string_conversion() {
        let err = AppError::AttemptInProgress;
        let s: String = err.into();
        assert!(s.contains("already in progress"));
    }
}
