#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use saints_api::config::ServerConfig;
use saints_api::router::build_app_router;
use saints_api::state::AppState;
use saints_tracker::testing::ScriptedProvider;

/// Build a test `ServerConfig` with safe defaults.
///
/// Upstream URLs point at a closed local port so nothing leaves the host.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        musicgpt_api_url: "http://127.0.0.1:9".to_string(),
        public_base_url: Some("https://saints.example".to_string()),
        poll_interval_secs: 10,
        poll_max_lifetime_secs: 600,
        notify_failures: false,
        anthropic_api_url: "http://127.0.0.1:9".to_string(),
        anthropic_model: "test-model".to_string(),
        openai_api_url: "http://127.0.0.1:9".to_string(),
        openai_model: "test-model".to_string(),
        static_dir: None,
    }
}

/// Build the full application router around a scripted provider.
///
/// Returns the state alongside the router so tests can subscribe to the
/// event bus and inspect the tracker.
pub fn build_test_app(provider: Arc<ScriptedProvider>) -> (Router, AppState) {
    let config = test_config();
    let state = AppState::new(config.clone(), provider, reqwest::Client::new());
    let app = build_app_router(state.clone(), &config);
    (app, state)
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body through the router.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

/// Send a POST request with an arbitrary body through the router.
pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
