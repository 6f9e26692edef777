pub mod generation;
pub mod health;
pub mod lyrics;
pub mod webhook;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket
/// /health                              health check
///
/// /generate-music                      submit a generation request (POST)
/// /webhook/musicgpt                    provider callback (POST)
///
/// /generate-lyrics-claude              lyrics via Anthropic (POST)
/// /generate-lyrics-openai              lyrics via OpenAI (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .merge(health::router())
        .merge(generation::router())
        .merge(webhook::router())
        .merge(lyrics::router())
}
