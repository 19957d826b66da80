//! Auth flow types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for one authentication attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of an authentication attempt
///
/// `Pending` is the only non-terminal status; an attempt transitions out of
/// it exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttemptStatus {
    /// Waiting for the user to complete authorization
    Pending,

    /// Authorization code received
    Succeeded,

    /// User closed the window, or the attempt was cancelled explicitly
    Cancelled,

    /// No callback and no manual close before the configured timeout
    TimedOut,

    /// Technical failure (callback port bind, window open)
    Failed {
        /// Error message
        message: String,
    },
}

impl AttemptStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttemptStatus::Pending)
    }
}

/// Record of one authentication attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthAttempt {
    /// Attempt identifier
    pub attempt_id: AttemptId,

    /// Authorization URL the window was pointed at (opaque to this layer)
    pub auth_url: String,

    /// When the attempt started
    pub started_at: DateTime<Utc>,

    /// Current status
    pub status: AttemptStatus,

    /// Authorization code, present once the attempt succeeded
    pub result: Option<String>,
}

/// Configuration for the auth flow
#[derive(Debug, Clone)]
pub struct AuthFlowConfig {
    /// Local port the callback listener binds to
    pub callback_port: u16,

    /// Path of the callback endpoint
    pub callback_path: String,

    /// How long to wait for the user before giving up
    pub timeout: Duration,

    /// Listener shutdown grace after a successful callback, so the
    /// confirmation page can flush to the browser
    pub callback_grace: Duration,
}

impl Default for AuthFlowConfig {
    fn default() -> Self {
        Self {
            callback_port: 3001,
            callback_path: "/callback".to_string(),
            timeout: Duration::from_secs(600),
            callback_grace: Duration::from_secs(2),
        }
    }
}

impl From<&acc_config::AppConfig> for AuthFlowConfig {
    fn from(config: &acc_config::AppConfig) -> Self {
        Self {
            callback_port: config.callback_port,
            callback_path: config.callback_path.clone(),
            timeout: config.auth_timeout(),
            callback_grace: config.callback_grace(),
        }
    }
}
