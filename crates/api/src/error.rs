use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saints_core::error::CoreError;
use saints_core::provider::ProviderError;
use saints_lyrics::LyricsError;
use saints_tracker::TrackerError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds upstream and
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent `{success: false, error, code}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `saints_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The music provider refused or failed a submission.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A lyric generation call failed.
    #[error(transparent)]
    Lyrics(#[from] LyricsError),

    /// A request body that could not be read as the expected JSON.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Validation(e) => AppError::Core(e),
            TrackerError::Provider(e) => AppError::Provider(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }

            // --- Upstream errors ---
            AppError::Provider(err) => classify_provider_error(err),
            AppError::Lyrics(err) => {
                tracing::warn!(error = %err, "Lyrics generation failed");
                (StatusCode::BAD_GATEWAY, "LYRICS_ERROR", err.to_string())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "success": false,
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a provider error into an HTTP status, error code, and message.
///
/// - `Rejected` (e.g. insufficient credits) maps to 400 with the
///   provider's own message.
/// - Transport, API, and parse failures map to 502.
fn classify_provider_error(err: &ProviderError) -> (StatusCode, &'static str, String) {
    match err {
        ProviderError::Rejected(msg) => (StatusCode::BAD_REQUEST, "PROVIDER_REJECTED", msg.clone()),
        other => {
            tracing::warn!(error = %other, "Provider call failed");
            (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", other.to_string())
        }
    }
}
