//! Local HTTP callback listener for the OAuth redirect
//!
//! A short-lived axum server bound to a fixed localhost port. It accepts the
//! identity provider's redirect, extracts the `code` query parameter, hands
//! the code to the owning attempt exactly once, and then shuts itself down
//! after a short grace period so the confirmation page reaches the browser.

use acc_types::{AppError, AppResult};
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Query parameters of the OAuth redirect
#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
}

/// State shared with the request handler
struct ServerState {
    /// One-shot hand-off to the owning attempt; consumed on the first
    /// well-formed callback, so later hits are no-ops
    code_tx: Mutex<Option<oneshot::Sender<String>>>,

    /// Last received code, kept for diagnostics
    received_code: RwLock<Option<String>>,

    /// Shutdown signal for the serve task
    shutdown: CancellationToken,

    /// Delay between a successful callback and self-shutdown
    grace: Duration,
}

/// Callback listener for one authentication attempt
pub struct CallbackServer {
    port: u16,
    path: String,
    state: Arc<ServerState>,
    listening: Arc<AtomicBool>,
    serve_task: Mutex<Option<JoinHandle<()>>>,
}

impl CallbackServer {
    /// Create a listener for the given port and callback path
    pub fn new(port: u16, path: &str, grace: Duration) -> Self {
        Self {
            port,
            path: path.to_string(),
            state: Arc::new(ServerState {
                code_tx: Mutex::new(None),
                received_code: RwLock::new(None),
                shutdown: CancellationToken::new(),
                grace,
            }),
            listening: Arc::new(AtomicBool::new(false)),
            serve_task: Mutex::new(None),
        }
    }

    /// Bind the port and start accepting the redirect
    ///
    /// `code_tx` is resolved with the authorization code when a well-formed
    /// callback arrives, at most once. Binding an occupied port fails with
    /// [`AppError::CallbackBind`]; that is a configuration error for the
    /// attempt and is not retried.
    pub async fn start(&self, code_tx: oneshot::Sender<String>) -> AppResult<()> {
        *self.state.code_tx.lock() = Some(code_tx);

        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        let listener =
            tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|e| AppError::CallbackBind {
                    port: self.port,
                    message: e.to_string(),
                })?;

        info!("Callback listener bound on {}", addr);

        let app = Router::new()
            .route(&self.path, get(handle_callback))
            .with_state(Arc::clone(&self.state));

        let shutdown = self.state.shutdown.clone();
        let listening = Arc::clone(&self.listening);
        listening.store(true, Ordering::SeqCst);

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await;
            if let Err(e) = result {
                warn!("Callback listener error: {}", e);
            }
            listening.store(false, Ordering::SeqCst);
        });
        *self.serve_task.lock() = Some(handle);

        Ok(())
    }

    /// Signal shutdown and release the port
    ///
    /// Idempotent; safe to call from any of the resolution paths (manual
    /// close, timeout, post-success cleanup) and multiple times.
    pub fn stop(&self) {
        if !self.state.shutdown.is_cancelled() {
            debug!("Stopping callback listener on port {}", self.port);
            self.state.shutdown.cancel();
        }
    }

    /// Wait for the serve task to finish after [`CallbackServer::stop`]
    ///
    /// The port is guaranteed released once this returns.
    pub async fn stopped(&self) {
        let handle = self.serve_task.lock().take();
        if let Some(handle) = handle {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }

    /// Last authorization code this listener received (diagnostic)
    pub fn last_code(&self) -> Option<String> {
        self.state.received_code.read().clone()
    }

    /// Whether the listener is currently accepting connections
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

async fn handle_callback(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    match params.code.as_deref() {
        Some(code) if !code.is_empty() => {
            state.received_code.write().replace(code.to_string());

            if let Some(tx) = state.code_tx.lock().take() {
                info!("Callback received with an authorization code");
                let _ = tx.send(code.to_string());

                // Let the confirmation page flush before closing the socket
                let shutdown = state.shutdown.clone();
                let grace = state.grace;
                tokio::spawn(async move {
                    tokio::time::sleep(grace).await;
                    shutdown.cancel();
                });
            } else {
                debug!("Duplicate callback after the attempt settled, ignoring");
            }
        }
        _ => {
            // Not an error by itself; the attempt stays pending for the
            // window-close or timeout path to resolve
            warn!("Callback received without an authorization code");
        }
    }

    Html(CONFIRMATION_PAGE)
}

/// Static page shown in the browser after the redirect, regardless of
/// whether a code was present
const CONFIRMATION_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Authentication complete</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
            margin: 0;
            background: #f5f5f5;
        }
        .container {
            background: white;
            padding: 3rem;
            border-radius: 1rem;
            box-shadow: 0 10px 30px rgba(0,0,0,0.15);
            text-align: center;
            max-width: 400px;
        }
        h1 {
            color: #1f2937;
            margin: 0 0 0.5rem;
            font-size: 1.75rem;
        }
        p {
            color: #6b7280;
            margin: 0;
            line-height: 1.6;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>Authentication complete</h1>
        <p>You can close this window and return to the application.</p>
    </div>
</body>
</html>"#;
