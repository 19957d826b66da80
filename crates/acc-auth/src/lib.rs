//! Interactive OAuth 2.0 authorization-code acquisition flow
//!
//! Runs one user-facing authentication attempt to a single terminal outcome:
//! a short-lived local HTTP listener accepts the identity provider's redirect
//! carrying the authorization code, while the flow manager races that
//! callback against the user closing the auth window, an external
//! cancellation, and a timeout. Whichever fires first wins; the rest become
//! no-ops.
//!
//! # Usage Example
//! ```no_run
//! use acc_auth::{AuthFlowConfig, AuthFlowManager, MockAuthWindow};
//!
//! # async fn run() -> acc_types::AppResult<()> {
//! let manager = AuthFlowManager::new(AuthFlowConfig::default());
//! let window = MockAuthWindow::new();
//! // `Some(code)` on success, `None` if the user bailed out or the
//! // attempt timed out
//! let code = manager.begin_auth("https://idp.example.com/authorize", &window).await?;
//! # Ok(())
//! # }
//! ```

mod callback_server;
mod flow_manager;
mod types;
mod window;

pub use callback_server::CallbackServer;
pub use flow_manager::AuthFlowManager;
pub use types::{AttemptId, AttemptStatus, AuthAttempt, AuthFlowConfig};
pub use window::{AuthWindow, MockAuthWindow};
