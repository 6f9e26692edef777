//! REST API client for the MusicGPT HTTP endpoints.
//!
//! Wraps job submission (`POST /MusicAI`) and status lookup
//! (`GET /byId`) using [`reqwest`], and exposes both through the
//! [`GenerationProvider`] trait.

use std::time::Duration;

use async_trait::async_trait;
use saints_core::provider::{
    GenerationProvider, JobStatusReport, ProviderError, SubmitJob, SubmittedJob,
};

use crate::messages;

/// Public MusicGPT API base URL.
pub const DEFAULT_API_URL: &str = "https://api.musicgpt.com/api/public/v1";

/// Conversion type queried for generated songs.
const AUDIO_CONVERSION_TYPE: &str = "audio_generation";

/// HTTP timeout for a single provider call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the MusicGPT API.
pub struct MusicGptApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the MusicGPT REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum MusicGptApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// MusicGPT returned a non-2xx status code.
    #[error("MusicGPT API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl From<MusicGptApiError> for ProviderError {
    fn from(err: MusicGptApiError) -> Self {
        match err {
            MusicGptApiError::Request(e) if e.is_decode() => ProviderError::Parse(e.to_string()),
            MusicGptApiError::Request(e) => ProviderError::Request(e.to_string()),
            MusicGptApiError::ApiError { status, body } => ProviderError::Api { status, body },
        }
    }
}

impl MusicGptApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `https://api.musicgpt.com/api/public/v1`.
    pub fn new(api_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(client, api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for sharing one connection pool across services).
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL requests are sent to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Submit a song generation request. Returns the raw response body.
    ///
    /// MusicGPT reports refusals (e.g. insufficient credits) with
    /// `success: false` in a 2xx or 4xx body, so 4xx bodies are returned
    /// for interpretation rather than treated as transport errors.
    pub async fn submit(
        &self,
        request: &SubmitJob,
        credential: &str,
    ) -> Result<String, MusicGptApiError> {
        let response = self
            .client
            .post(format!("{}/MusicAI", self.api_url))
            .header(reqwest::header::AUTHORIZATION, credential)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.text().await?)
    }

    /// Fetch a single conversion by id. Returns the raw response body.
    pub async fn get_conversion(
        &self,
        conversion_id: &str,
        credential: &str,
    ) -> Result<String, MusicGptApiError> {
        let response = self
            .client
            .get(format!("{}/byId", self.api_url))
            .query(&[
                ("conversionType", AUDIO_CONVERSION_TYPE),
                ("conversion_id", conversion_id),
            ])
            .header(reqwest::header::AUTHORIZATION, credential)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.text().await?)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`MusicGptApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, MusicGptApiError> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response)
    }

    async fn api_error(response: reqwest::Response) -> MusicGptApiError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        MusicGptApiError::ApiError {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl GenerationProvider for MusicGptApi {
    async fn submit_job(
        &self,
        request: &SubmitJob,
        credential: &str,
    ) -> Result<SubmittedJob, ProviderError> {
        let body = self.submit(request, credential).await?;
        let submitted = messages::parse_submit(&body)?;

        tracing::info!(
            job_ids = ?submitted.job_ids,
            provider_task_id = ?submitted.provider_task_id,
            "Song submitted to MusicGPT",
        );

        Ok(submitted)
    }

    async fn fetch_status(
        &self,
        job_id: &str,
        credential: &str,
    ) -> Result<JobStatusReport, ProviderError> {
        let body = self.get_conversion(job_id, credential).await?;
        messages::parse_status(&body)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = MusicGptApi::new("http://localhost:9999/v1/".into());
        assert_eq!(api.api_url(), "http://localhost:9999/v1");
    }

    #[test]
    fn api_error_maps_to_provider_api_error() {
        let err: ProviderError = MusicGptApiError::ApiError {
            status: 503,
            body: "busy".into(),
        }
        .into();
        assert_matches!(err, ProviderError::Api { status: 503, .. });
    }

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        let api = MusicGptApi::new("http://127.0.0.1:9".into());
        let result = api.fetch_status("C1", "key").await;
        assert_matches!(result, Err(ProviderError::Request(_)));
    }
}
