//! Auth flow manager - orchestrates one interactive authentication attempt

use crate::callback_server::CallbackServer;
use crate::types::{AttemptId, AttemptStatus, AuthAttempt, AuthFlowConfig};
use crate::window::AuthWindow;
use acc_types::{AppError, AppResult};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Which race participant settled the attempt
enum RaceOutcome {
    Code(String),
    ChannelClosed,
    WindowClosed,
    Cancelled,
    TimedOut,
}

/// Auth flow manager
///
/// Runs one authentication attempt at a time to a single terminal outcome:
/// starts the callback listener, opens the auth window, and races the
/// callback against a user window-close, an external [`AuthFlowManager::cancel`],
/// and the configured timeout. The first event to arrive is authoritative;
/// every resolution path tears down the listener and the window.
pub struct AuthFlowManager {
    config: AuthFlowConfig,

    /// The most recent attempt; `Pending` status here means one is in flight
    attempt: Arc<RwLock<Option<AuthAttempt>>>,

    /// Cancellation handle, armed only while an attempt is pending
    cancel: Mutex<Option<CancellationToken>>,
}

impl AuthFlowManager {
    /// Create a new auth flow manager
    pub fn new(config: AuthFlowConfig) -> Self {
        Self {
            config,
            attempt: Arc::new(RwLock::new(None)),
            cancel: Mutex::new(None),
        }
    }

    /// Run one complete authentication attempt
    ///
    /// # Arguments
    /// * `auth_url` - Absolute authorization URL supplied by the backend
    /// * `window` - Interactive window the user authenticates in
    ///
    /// # Returns
    /// * `Ok(Some(code))` - the identity provider delivered an authorization code
    /// * `Ok(None)` - the user closed the window, the attempt was cancelled,
    ///   or the timeout elapsed; "login cancelled", not a technical failure
    /// * `Err(_)` - configuration failure (invalid URL, callback port bind,
    ///   concurrent attempt)
    pub async fn begin_auth(
        &self,
        auth_url: &str,
        window: &dyn AuthWindow,
    ) -> AppResult<Option<String>> {
        let url = Url::parse(auth_url)
            .map_err(|e| AppError::InvalidParams(format!("Invalid auth URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::InvalidParams(format!(
                "Auth URL must be http(s), got scheme '{}'",
                url.scheme()
            )));
        }

        let attempt_id = AttemptId::new();
        let cancel = CancellationToken::new();

        // Claim the singleton attempt slot; the callback port is a shared
        // resource, so concurrent attempts are rejected rather than queued
        {
            let mut attempt = self.attempt.write();
            if matches!(
                attempt.as_ref().map(|a| &a.status),
                Some(AttemptStatus::Pending)
            ) {
                return Err(AppError::AttemptInProgress);
            }
            *attempt = Some(AuthAttempt {
                attempt_id,
                auth_url: auth_url.to_string(),
                started_at: Utc::now(),
                status: AttemptStatus::Pending,
                result: None,
            });
            *self.cancel.lock() = Some(cancel.clone());
        }

        info!("Starting authentication attempt {}", attempt_id);

        let server = CallbackServer::new(
            self.config.callback_port,
            &self.config.callback_path,
            self.config.callback_grace,
        );
        let (code_tx, code_rx) = oneshot::channel();

        if let Err(e) = server.start(code_tx).await {
            warn!("Attempt {} failed to start listener: {}", attempt_id, e);
            self.finish(AttemptStatus::Failed {
                message: e.to_string(),
            });
            return Err(e);
        }

        if let Err(e) = window.open(auth_url).await {
            warn!("Attempt {} failed to open auth window: {}", attempt_id, e);
            server.stop();
            server.stopped().await;
            self.finish(AttemptStatus::Failed {
                message: e.to_string(),
            });
            return Err(e);
        }

        // First event wins; `biased` keeps the resolution deterministic when
        // several sources are ready in the same tick (code beats close)
        let outcome = tokio::select! {
            biased;
            code = code_rx => match code {
                Ok(code) => RaceOutcome::Code(code),
                Err(_) => RaceOutcome::ChannelClosed,
            },
            _ = window.wait_closed() => RaceOutcome::WindowClosed,
            _ = cancel.cancelled() => RaceOutcome::Cancelled,
            _ = tokio::time::sleep(self.config.timeout) => RaceOutcome::TimedOut,
        };

        let (status, code) = match outcome {
            RaceOutcome::Code(code) => {
                info!("Attempt {} received an authorization code", attempt_id);
                window.close().await;
                (AttemptStatus::Succeeded, Some(code))
            }
            RaceOutcome::ChannelClosed => {
                // Listener dropped the sender without delivering a code
                warn!("Attempt {} callback channel closed early", attempt_id);
                window.close().await;
                (AttemptStatus::Cancelled, None)
            }
            RaceOutcome::WindowClosed => {
                info!("Attempt {} window closed by user", attempt_id);
                (AttemptStatus::Cancelled, None)
            }
            RaceOutcome::Cancelled => {
                info!("Attempt {} cancelled", attempt_id);
                window.close().await;
                (AttemptStatus::Cancelled, None)
            }
            RaceOutcome::TimedOut => {
                warn!(
                    "Attempt {} timed out after {:?}",
                    attempt_id, self.config.timeout
                );
                window.close().await;
                (AttemptStatus::TimedOut, None)
            }
        };

        // Converging cleanup path: release the port before returning so the
        // next attempt can bind it without error
        server.stop();
        server.stopped().await;

        self.finish_with_result(status, code.clone());

        Ok(code)
    }

    /// Cancel the pending attempt, if any
    ///
    /// Behaves exactly like the user closing the window: the attempt
    /// resolves with `None` and all resources are torn down.
    pub fn cancel(&self) -> AppResult<()> {
        let guard = self.cancel.lock();
        match guard.as_ref() {
            Some(token) => {
                info!("Cancelling pending authentication attempt");
                token.cancel();
                Ok(())
            }
            None => Err(AppError::AuthFlow(
                "No authentication attempt in progress".to_string(),
            )),
        }
    }

    /// Whether an attempt is currently pending
    pub fn is_pending(&self) -> bool {
        matches!(
            self.attempt.read().as_ref().map(|a| &a.status),
            Some(AttemptStatus::Pending)
        )
    }

    /// The most recent attempt record, if any
    pub fn last_attempt(&self) -> Option<AuthAttempt> {
        self.attempt.read().clone()
    }

    fn finish(&self, status: AttemptStatus) {
        self.finish_with_result(status, None);
    }

    /// Apply the terminal transition and clear attempt-scoped state
    fn finish_with_result(&self, status: AttemptStatus, result: Option<String>) {
        *self.cancel.lock() = None;
        let mut attempt = self.attempt.write();
        if let Some(a) = attempt.as_mut() {
            a.status = status;
            a.result = result;
        }
    }
}
