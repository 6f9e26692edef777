//! Route definitions for provider callbacks.
//!
//! ```text
//! POST   /webhook/musicgpt               musicgpt_webhook
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/musicgpt", post(webhook::musicgpt_webhook))
}
