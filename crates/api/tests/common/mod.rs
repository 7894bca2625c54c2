#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use maxpizza_core::config::AuthConfig;
use maxpizza_core::memory::{MemoryAccountStore, MemorySessionStore, RecordingNotifier};
use maxpizza_core::AuthCoordinator;
use tower::ServiceExt;

use maxpizza_api::config::ServerConfig;
use maxpizza_api::router::build_app_router;
use maxpizza_api::state::AppState;

pub const FRONT_HOST: &str = "http://front.test";

/// Build a test `ServerConfig` with safe defaults and a cheap hash cost.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        front_host: FRONT_HOST.to_string(),
        auth: AuthConfig {
            access_token_secret: "test-access-secret".into(),
            refresh_token_secret: "test-refresh-secret".into(),
            access_token_ttl: Duration::hours(2),
            refresh_token_ttl: None,
            hash_cost: 1,
            public_host: "api.test".into(),
            public_port: 3000,
        },
        email: None,
    }
}

/// A router over in-memory stores, plus handles to inspect them.
pub struct TestApp {
    pub router: Router,
    pub accounts: Arc<MemoryAccountStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// The router is cheap to clone; each request gets its own copy.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app() -> TestApp {
    build_test_app_with(RecordingNotifier::new())
}

pub fn build_test_app_with(notifier: RecordingNotifier) -> TestApp {
    let config = test_config();
    let accounts = Arc::new(MemoryAccountStore::new());
    let sessions = Arc::new(MemorySessionStore::new(Arc::clone(&accounts)));
    let notifier = Arc::new(notifier);

    let auth = AuthCoordinator::new(
        config.auth.clone(),
        accounts.clone(),
        sessions.clone(),
        notifier.clone(),
    )
    .expect("test auth config is valid");

    let state = AppState {
        config: Arc::new(config.clone()),
        auth: Arc::new(auth),
    };

    TestApp {
        router: build_app_router(state, &config),
        accounts,
        sessions,
        notifier,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// GET with `Authorization: Bearer <token>` and the given user agent.
pub async fn get_auth(app: Router, uri: &str, token: &str, user_agent: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("user-agent", user_agent)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a JSON body with the given user agent.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    user_agent: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("user-agent", user_agent)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
