#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tokenward_api::auth::jwt::{JwtConfig, JwtSigner};
use tokenward_api::auth::secret_hash::{HashingConfig, SecretHasher};
use tokenward_api::auth::service::TokenService;
use tokenward_api::config::ServerConfig;
use tokenward_api::notifications::NotificationDispatcher;
use tokenward_api::router::build_app_router;
use tokenward_api::state::AppState;
use tokenward_core::memory_store::MemorySessionStore;
use tokenward_core::notify::{AddressChangeNotice, Notifier, NotifyError};

pub const JWT_SECRET: &str = "integration-test-secret";

/// Notifier that keeps every notice it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<(String, AddressChangeNotice)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        destination: &str,
        notice: &AddressChangeNotice,
    ) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .unwrap()
            .push((destination.to_string(), notice.clone()));
        Ok(())
    }
}

/// A router plus handles on the collaborators behind it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemorySessionStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub notifications: NotificationDispatcher,
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and Argon2 costs low enough for debug builds.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        trust_forwarded_for: false,
        alert_recipient: "security@example.com".to_string(),
        database_url: None,
        session_cleanup_interval_secs: 0,
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_hours: 24,
        },
        hashing: HashingConfig {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        },
    }
}

/// Build the full application router over an in-memory store.
///
/// Uses [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(MemorySessionStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let notifications =
        NotificationDispatcher::new(notifier.clone(), config.alert_recipient.clone());

    let tokens = Arc::new(TokenService::new(
        JwtSigner::new(&config.jwt),
        SecretHasher::new(&config.hashing).unwrap(),
        store.clone(),
        notifications.clone(),
        config.jwt.refresh_lifetime().unwrap(),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        tokens,
        store: store.clone(),
        notifications: notifications.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        notifier,
        notifications,
    }
}

/// Attach the peer address axum records under `into_make_service_with_connect_info`.
pub fn with_peer(mut request: Request<Body>, ip: &str) -> Request<Body> {
    let addr = SocketAddr::new(ip.parse().unwrap(), 40_000);
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str, ip: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, with_peer(request, ip)).await
}

pub async fn post_json(
    app: &TestApp,
    uri: &str,
    body: serde_json::Value,
    ip: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, with_peer(request, ip)).await
}

pub async fn post_form(app: &TestApp, uri: &str, body: &str, ip: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, with_peer(request, ip)).await
}

/// Subject (`sub`) carried by an access token signed with the test secret.
pub fn subject_of(access_token: &str) -> String {
    JwtSigner::new(&test_config().jwt)
        .verify(access_token)
        .unwrap()
        .sub
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Issue a pair for `user_id` from `ip` and return `(access_token, refresh_token)`.
pub async fn issue(app: &TestApp, user_id: &str, ip: &str) -> (String, String) {
    let response = get(app, &format!("/api/v1/auth/generate?id={user_id}"), ip).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let json = body_json(response).await;
    (
        json["access_token"].as_str().unwrap().to_string(),
        json["refresh_token"].as_str().unwrap().to_string(),
    )
}

pub async fn refresh(
    app: &TestApp,
    access_token: &str,
    refresh_token: &str,
    ip: &str,
) -> Response<Body> {
    post_json(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({
            "access_token": access_token,
            "refresh_token": refresh_token,
        }),
        ip,
    )
    .await
}
