//! End-to-end login test against a fake backend
//!
//! Stands up an in-process backend with the auth endpoints and drives the
//! complete login: handshake, interactive flow (mock window + simulated
//! provider redirect), code exchange, token persistence.

use acc_auth::{AuthFlowConfig, AuthFlowManager, AuthWindow, MockAuthWindow};
use acc_backend::{BackendClient, ACCESS_TOKEN_KEY};
use acc_keychain::CachedKeychain;
use axum::extract::Query;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

const BACKEND_PORT: u16 = 3501;
const CALLBACK_PORT: u16 = 3502;

async fn spawn_fake_backend() {
    let app = Router::new()
        .route(
            "/api/auth/start",
            get(|| async {
                Json(json!({
                    "authUrl": "https://idp.example.com/authorize?client_id=acc",
                    "requestId": "req-1"
                }))
            }),
        )
        .route(
            "/api/auth/callback",
            post(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("code").map(String::as_str), Some("GOOD_CODE"));
                assert_eq!(params.get("requestId").map(String::as_str), Some("req-1"));
                Json(json!({
                    "accessToken": "acc_access_token",
                    "refreshToken": "acc_refresh_token",
                    "tokenType": "Bearer",
                    "expiresIn": 3600
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", BACKEND_PORT))
        .await
        .expect("failed to bind fake backend");
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

#[tokio::test]
async fn test_full_login_flow() {
    spawn_fake_backend().await;

    let keychain = CachedKeychain::mock();
    let client = BackendClient::new(
        &format!("http://127.0.0.1:{}/api", BACKEND_PORT),
        "acc-exporter",
        keychain.clone(),
    );

    let flow = AuthFlowManager::new(AuthFlowConfig {
        callback_port: CALLBACK_PORT,
        callback_path: "/callback".to_string(),
        timeout: Duration::from_secs(5),
        callback_grace: Duration::from_millis(50),
    });
    let window = MockAuthWindow::new();

    // Simulate the identity provider redirecting the window to the
    // local callback once the user has authenticated
    let provider = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        reqwest::get(format!(
            "http://127.0.0.1:{}/callback?code=GOOD_CODE",
            CALLBACK_PORT
        ))
        .await
        .expect("redirect failed");
    });

    let tokens = client.login(&flow, &window).await.unwrap();

    let tokens = tokens.expect("login should produce tokens");
    assert_eq!(tokens.access_token, "acc_access_token");
    assert!(!window.is_open());

    // The window was pointed at the backend-provided authorization URL
    assert_eq!(
        window.opened_url().as_deref(),
        Some("https://idp.example.com/authorize?client_id=acc")
    );

    // Tokens were persisted through the keychain facade
    assert_eq!(
        keychain.get("acc-exporter", ACCESS_TOKEN_KEY).unwrap(),
        Some("acc_access_token".to_string())
    );
    assert_eq!(client.access_token().unwrap(), Some("acc_access_token".to_string()));

    provider.await.unwrap();
}

#[tokio::test]
async fn test_login_cancelled_returns_none() {
    // Reuse the fake backend port only for the handshake; the callback
    // listener uses its own port so the two tests do not collide
    let app = Router::new().route(
        "/api/auth/start",
        get(|| async {
            Json::<Value>(json!({
                "authUrl": "https://idp.example.com/authorize",
                "requestId": "req-2"
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 3503))
        .await
        .unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = BackendClient::new(
        "http://127.0.0.1:3503/api",
        "acc-exporter",
        CachedKeychain::mock(),
    );
    let flow = AuthFlowManager::new(AuthFlowConfig {
        callback_port: 3504,
        callback_path: "/callback".to_string(),
        timeout: Duration::from_secs(5),
        callback_grace: Duration::from_millis(50),
    });
    let window = std::sync::Arc::new(MockAuthWindow::new());

    let closer = {
        let window = std::sync::Arc::clone(&window);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            window.user_close();
        })
    };

    let tokens = client.login(&flow, window.as_ref()).await.unwrap();
    assert!(tokens.is_none());
    assert_eq!(client.access_token().unwrap(), None);

    closer.await.unwrap();
}
