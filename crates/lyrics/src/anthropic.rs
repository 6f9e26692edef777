//! Lyrics via the Anthropic Messages API.

use serde::Deserialize;

use crate::prompt::lyrics_prompt;
use crate::{ensure_success, LyricsError, MAX_TOKENS};

/// Public Anthropic API base URL.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";

/// Default model used for lyric writing.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const API_VERSION: &str = "2023-06-01";

/// Client for `POST /v1/messages`.
pub struct AnthropicLyrics {
    client: reqwest::Client,
    api_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicLyrics {
    pub fn new(client: reqwest::Client, api_url: String, model: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Generate lyrics for `theme` in `genre` using the caller's API key.
    pub async fn generate(
        &self,
        theme: &str,
        genre: &str,
        api_key: &str,
    ) -> Result<String, LyricsError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{
                "role": "user",
                "content": lyrics_prompt(genre, theme),
            }],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let parsed: MessagesResponse = ensure_success(response).await?.json().await?;
        let lyrics = extract_text(parsed)?;
        tracing::debug!(model = %self.model, chars = lyrics.len(), "Lyrics generated");
        Ok(lyrics)
    }
}

fn extract_text(response: MessagesResponse) -> Result<String, LyricsError> {
    response
        .content
        .into_iter()
        .find_map(|block| block.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LyricsError::MissingContent)
}
