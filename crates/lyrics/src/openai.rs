//! Lyrics via the OpenAI Chat Completions API.

use serde::Deserialize;

use crate::prompt::lyrics_prompt;
use crate::{ensure_success, LyricsError, MAX_TOKENS};

/// Public OpenAI API base URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com";

/// Default model used for lyric writing.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Client for `POST /v1/chat/completions`.
pub struct OpenAiLyrics {
    client: reqwest::Client,
    api_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiLyrics {
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
            .post(format!("{}/v1/chat/completions", self.api_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: CompletionResponse = ensure_success(response).await?.json().await?;
        let lyrics = extract_text(parsed)?;
        tracing::debug!(model = %self.model, chars = lyrics.len(), "Lyrics generated");
        Ok(lyrics)
    }
}

fn extract_text(response: CompletionResponse) -> Result<String, LyricsError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LyricsError::MissingContent)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn extracts_first_choice() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Chorus\nHallelujah"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Chorus\nHallelujah");
    }

    #[test]
    fn no_choices_is_missing() {
        let response: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_matches!(extract_text(response), Err(LyricsError::MissingContent));
    }
}
