//! Handlers for lyric generation.
//!
//! Routes:
//! - `POST /api/generate-lyrics-claude`  - lyrics via the Anthropic API
//! - `POST /api/generate-lyrics-openai`  - lyrics via the OpenAI API

use axum::extract::State;
use axum::Json;
use saints_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeLyricsRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub anthropic_api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiLyricsRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub openai_api_key: String,
}

#[derive(Debug, Serialize)]
pub struct LyricsResponse {
    pub success: bool,
    pub lyrics: String,
}

/// POST /api/generate-lyrics-claude
pub async fn generate_lyrics_claude(
    State(state): State<AppState>,
    AppJson(input): AppJson<ClaudeLyricsRequest>,
) -> AppResult<Json<LyricsResponse>> {
    validate(&input.prompt, &input.anthropic_api_key, "anthropicApiKey")?;

    let lyrics = state
        .anthropic
        .generate(input.prompt.trim(), genre_or_default(&input.genre), &input.anthropic_api_key)
        .await?;

    Ok(Json(LyricsResponse {
        success: true,
        lyrics,
    }))
}

/// POST /api/generate-lyrics-openai
pub async fn generate_lyrics_openai(
    State(state): State<AppState>,
    AppJson(input): AppJson<OpenAiLyricsRequest>,
) -> AppResult<Json<LyricsResponse>> {
    validate(&input.prompt, &input.openai_api_key, "openaiApiKey")?;

    let lyrics = state
        .openai
        .generate(input.prompt.trim(), genre_or_default(&input.genre), &input.openai_api_key)
        .await?;

    Ok(Json(LyricsResponse {
        success: true,
        lyrics,
    }))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn validate(prompt: &str, api_key: &str, key_field: &str) -> Result<(), AppError> {
    if api_key.trim().is_empty() {
        return Err(CoreError::Validation(format!("{key_field} is required")).into());
    }
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation("prompt is required".into()).into());
    }
    Ok(())
}

fn genre_or_default(genre: &str) -> &str {
    match genre.trim() {
        "" => "pop",
        genre => genre,
    }
}
