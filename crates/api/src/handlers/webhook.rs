//! Provider callback handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// POST /api/webhook/musicgpt
///
/// Always acknowledges with `200 {received: true}`. The body is decoded
/// leniently and each job notice is processed on its own spawned task, so
/// provider retries are never triggered by our own processing errors.
pub async fn musicgpt_webhook(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let notices = saints_musicgpt::webhook::parse_webhook(&body);
    tracing::debug!(notices = notices.len(), bytes = body.len(), "MusicGPT webhook received");

    for notice in notices {
        let tracker = state.tracker.clone();
        tokio::spawn(async move {
            let outcome = tracker.handle_webhook(&notice).await;
            tracing::debug!(job_id = %notice.job_id, ?outcome, "Webhook processed");
        });
    }

    Json(json!({ "received": true }))
}
