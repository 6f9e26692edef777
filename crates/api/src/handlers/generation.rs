//! Handlers for song generation.
//!
//! Routes:
//! - `POST /api/generate-music` - submit a request and start tracking it

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use saints_tracker::GenerationRequest;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::state::AppState;

/// Request body for `POST /api/generate-music`.
///
/// Accepts the field names of both the browser client and the provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMusicRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, alias = "music_style")]
    pub style: String,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default, alias = "make_instrumental")]
    pub make_instrumental: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "taskId")]
    pub client_task_id: String,
    #[serde(default, alias = "musicGptApiKey")]
    pub credential: String,
}

/// Successful submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMusicResponse {
    pub success: bool,
    pub job_ids: Vec<String>,
    /// Provider-side id of the whole submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Provider's estimate in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<f64>,
}

impl From<GenerateMusicRequest> for GenerationRequest {
    fn from(input: GenerateMusicRequest) -> Self {
        GenerationRequest {
            prompt: input.prompt,
            style: input.style,
            lyrics: input.lyrics,
            make_instrumental: input.make_instrumental,
            title: input.title,
            client_task_id: input.client_task_id,
            credential: input.credential,
        }
    }
}

/// POST /api/generate-music
///
/// Validates the request, submits it to the provider with the caller's
/// credential, and registers every returned job for tracking. Finished
/// tracks arrive later over the WebSocket.
pub async fn generate_music(
    State(state): State<AppState>,
    AppJson(input): AppJson<GenerateMusicRequest>,
) -> AppResult<Json<GenerateMusicResponse>> {
    let submission = state
        .tracker
        .submit(input.into(), state.config.webhook_url())
        .await?;

    Ok(Json(GenerateMusicResponse {
        success: true,
        job_ids: submission.job_ids,
        task_id: submission.provider_task_id,
        eta: submission.eta_seconds,
    }))
}
