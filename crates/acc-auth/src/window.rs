//! Auth window seam
//!
//! The interactive window the user authenticates in belongs to the desktop
//! shell; the flow only needs to open it, close it, and observe the user
//! closing it. `AuthWindow` is that seam, and [`MockAuthWindow`] is the
//! in-process implementation used by tests.

use acc_types::AppResult;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

/// Handle to the interactive authentication window
///
/// Exclusively owned by the active attempt; nobody else may close or
/// navigate it while the attempt is pending.
#[async_trait]
pub trait AuthWindow: Send + Sync {
    /// Show the window and navigate it to the authorization URL
    async fn open(&self, url: &str) -> AppResult<()>;

    /// Close the window; must be a no-op if it is already closed
    async fn close(&self);

    /// Resolve once the window has been closed, by the user or otherwise
    async fn wait_closed(&self);

    /// Whether the window is currently open
    fn is_open(&self) -> bool;
}

/// In-process auth window for tests
///
/// Tracks the opened URL and exposes [`MockAuthWindow::user_close`] to
/// simulate the user dismissing the window.
pub struct MockAuthWindow {
    opened_url: Mutex<Option<String>>,
    closed_tx: watch::Sender<bool>,
}

impl MockAuthWindow {
    pub fn new() -> Self {
        let (closed_tx, _) = watch::channel(false);
        Self {
            opened_url: Mutex::new(None),
            closed_tx,
        }
    }

    /// Simulate the user closing the window
    pub fn user_close(&self) {
        self.closed_tx.send_replace(true);
    }

    /// URL the window was last opened at
    pub fn opened_url(&self) -> Option<String> {
        self.opened_url.lock().clone()
    }
}

impl Default for MockAuthWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthWindow for MockAuthWindow {
    async fn open(&self, url: &str) -> AppResult<()> {
        *self.opened_url.lock() = Some(url.to_string());
        Ok(())
    }

    async fn close(&self) {
        self.closed_tx.send_replace(true);
    }

    async fn wait_closed(&self) {
        let mut rx = self.closed_tx.subscribe();
        // Err means the sender is gone, which also counts as closed
        let _ = rx.wait_for(|closed| *closed).await;
    }

    fn is_open(&self) -> bool {
        !*self.closed_tx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_open_records_url() {
        let window = MockAuthWindow::new();

        window.open("https://idp.example.com/authorize").await.unwrap();

        assert!(window.is_open());
        assert_eq!(
            window.opened_url(),
            Some("https://idp.example.com/authorize".to_string())
        );
    }

    #[tokio::test]
    async fn test_wait_closed_resolves_on_user_close() {
        let window = Arc::new(MockAuthWindow::new());
        window.open("https://example.com").await.unwrap();

        let waiter = {
            let window = Arc::clone(&window);
            tokio::spawn(async move { window.wait_closed().await })
        };

        window.user_close();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait_closed did not resolve")
            .unwrap();
        assert!(!window.is_open());
    }

    #[tokio::test]
    async fn test_wait_closed_resolves_when_already_closed() {
        let window = MockAuthWindow::new();
        window.close().await;

        // Must not hang on an already-closed window
        tokio::time::timeout(Duration::from_secs(1), window.wait_closed())
            .await
            .expect("wait_closed did not resolve");
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let window = MockAuthWindow::new();

        window.close().await;
        window.close().await;
        window.user_close();

        assert!(!window.is_open());
    }
}
