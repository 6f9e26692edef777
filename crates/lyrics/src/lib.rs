//! Lyric generation through hosted language-model APIs.
//!
//! Both clients are stateless pass-throughs: one HTTP call per request,
//! no retries, no caching.

pub mod anthropic;
pub mod openai;
pub mod prompt;

pub use anthropic::AnthropicLyrics;
pub use openai::OpenAiLyrics;

/// Token ceiling for generated lyrics.
pub const MAX_TOKENS: u32 = 1500;

/// Errors from a lyric generation call.
#[derive(Debug, thiserror::Error)]
pub enum LyricsError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream API returned a non-2xx status code.
    #[error("Lyrics API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response did not contain generated text.
    #[error("Lyrics response contained no text")]
    MissingContent,
}

/// Ensure a response has a success status, capturing the body otherwise.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, LyricsError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(LyricsError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
