//! Request validation for the lyric generation endpoints.
//!
//! Upstream calls are not exercised here; only the checks that run before
//! any request leaves the server.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, post_json};
use saints_tracker::testing::ScriptedProvider;
use serde_json::json;

fn app() -> axum::Router {
    common::build_test_app(Arc::new(ScriptedProvider::with_jobs(&["J1"]))).0
}

#[tokio::test]
async fn claude_lyrics_require_api_key() {
    let response = post_json(
        app(),
        "/api/generate-lyrics-claude",
        json!({ "prompt": "sunrise", "genre": "Gospel" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "anthropicApiKey is required");
}

#[tokio::test]
async fn openai_lyrics_require_prompt() {
    let response = post_json(
        app(),
        "/api/generate-lyrics-openai",
        json!({ "prompt": "  ", "genre": "Gospel", "openaiApiKey": "sk-test" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "prompt is required");
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let response = post_json(
        app(),
        "/api/generate-lyrics-openai",
        json!({ "prompt": "sunrise", "genre": "Gospel", "openaiApiKey": "sk-test" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn malformed_lyrics_body_is_bad_request() {
    let response = common::post_raw(app(), "/api/generate-lyrics-claude", "[1, 2").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}
