//! Client for the exporter backend's auth endpoints
//!
//! The backend performs the real ACC integration; this client only drives
//! its auth surface: fetch the authorization URL, exchange the code the
//! interactive flow produced, refresh on demand, and keep the resulting
//! tokens in the keychain.

use acc_auth::{AuthFlowManager, AuthWindow};
use acc_keychain::CachedKeychain;
use acc_types::{AppError, AppResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Keychain key for the ACC access token
pub const ACCESS_TOKEN_KEY: &str = "acc-token";

/// Keychain key for the ACC refresh token
pub const REFRESH_TOKEN_KEY: &str = "acc-refresh-token";

/// Response of `GET /auth/start`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStartResponse {
    /// Authorization URL to open in the auth window
    pub auth_url: String,

    /// Backend-side handle for this authorization request
    pub request_id: String,
}

/// Token response from the backend's exchange and refresh endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub token_type: String,

    #[serde(default)]
    pub expires_in: Option<i64>,

    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
}

/// Client for the exporter backend
pub struct BackendClient {
    base_url: String,
    client: Client,
    keychain: CachedKeychain,
    keychain_service: String,
}

impl BackendClient {
    /// Create a client for the backend at `base_url` (e.g. `http://localhost:5188/api`)
    pub fn new(base_url: &str, keychain_service: &str, keychain: CachedKeychain) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            keychain,
            keychain_service: keychain_service.to_string(),
        }
    }

    /// Ask the backend to start an authorization request
    ///
    /// Returns the authorization URL the auth window should be pointed at.
    pub async fn start_auth(&self) -> AppResult<AuthStartResponse> {
        let url = format!("{}/auth/start", self.base_url);
        debug!("Requesting authorization URL from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to reach backend: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!(
                "auth/start failed with status {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse auth/start response: {}", e)))
    }

    /// Exchange an authorization code for tokens and persist them
    pub async fn exchange_code(&self, code: &str, request_id: &str) -> AppResult<TokenResponse> {
        let url = format!("{}/auth/callback", self.base_url);
        info!("Exchanging authorization code with the backend");

        let response = self
            .client
            .post(&url)
            .query(&[("code", code), ("requestId", request_id)])
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to send exchange request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Code exchange failed with status {}: {}", status, body);
            return Err(AppError::Backend(format!(
                "Code exchange failed with status {}: {}",
                status, body
            )));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse token response: {}", e)))?;

        self.store_tokens(&tokens)?;
        info!("Code exchange successful");

        Ok(tokens)
    }

    /// Refresh the access token using the stored refresh token
    pub async fn refresh_token(&self) -> AppResult<TokenResponse> {
        let refresh_token = self
            .keychain
            .get(&self.keychain_service, REFRESH_TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Backend("No refresh token stored".to_string()))?;

        let url = format!("{}/auth/refresh", self.base_url);
        debug!("Refreshing access token");

        let response = self
            .client
            .post(&url)
            .json(&refresh_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to send refresh request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!(
                "Token refresh failed with status {}: {}",
                status, body
            )));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse refresh response: {}", e)))?;

        self.store_tokens(&tokens)?;
        Ok(tokens)
    }

    /// Run the complete interactive login: handshake, auth window, exchange
    ///
    /// Returns `Ok(None)` when the user cancelled or the flow timed out,
    /// mirroring the flow manager's null result.
    pub async fn login(
        &self,
        flow: &AuthFlowManager,
        window: &dyn AuthWindow,
    ) -> AppResult<Option<TokenResponse>> {
        let start = self.start_auth().await?;

        let code = flow.begin_auth(&start.auth_url, window).await?;
        match code {
            Some(code) => {
                let tokens = self.exchange_code(&code, &start.request_id).await?;
                Ok(Some(tokens))
            }
            None => {
                info!("Login abandoned before a code was delivered");
                Ok(None)
            }
        }
    }

    /// Stored ACC access token, if any
    pub fn access_token(&self) -> AppResult<Option<String>> {
        Ok(self
            .keychain
            .get(&self.keychain_service, ACCESS_TOKEN_KEY)?
            .filter(|t| !t.is_empty()))
    }

    /// Drop the stored tokens
    pub fn logout(&self) -> AppResult<()> {
        self.keychain.delete(&self.keychain_service, ACCESS_TOKEN_KEY)?;
        self.keychain.delete(&self.keychain_service, REFRESH_TOKEN_KEY)?;
        info!("Cleared stored ACC tokens");
        Ok(())
    }

    fn store_tokens(&self, tokens: &TokenResponse) -> AppResult<()> {
        self.keychain.store(
            &self.keychain_service,
            ACCESS_TOKEN_KEY,
            &tokens.access_token,
        )?;
        if let Some(ref refresh_token) = tokens.refresh_token {
            self.keychain
                .store(&self.keychain_service, REFRESH_TOKEN_KEY, refresh_token)?;
        }
        debug!("Tokens stored in keychain");
        Ok(())
    }
}
