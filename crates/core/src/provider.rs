//! Contract for the external music-generation provider.
//!
//! The tracker only talks to the provider through [`GenerationProvider`],
//! so the HTTP client can be swapped for a scripted fake in tests.

use async_trait::async_trait;
use serde::Serialize;

use crate::types::JobId;

// ---------------------------------------------------------------------------
// Requests / responses
// ---------------------------------------------------------------------------

/// A generation request forwarded to the provider.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitJob {
    pub prompt: String,
    pub music_style: String,
    pub lyrics: String,
    pub make_instrumental: bool,
    /// Callback the provider should hit on completion, if push delivery
    /// is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedJob {
    /// One id per variant the provider will produce.
    pub job_ids: Vec<JobId>,
    /// Provider-side id of the whole submission, when reported.
    pub provider_task_id: Option<String>,
    /// Provider's estimate of seconds until completion.
    pub eta_seconds: Option<f64>,
}

/// Provider-reported progress of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    InProgress,
    Complete,
    Failed,
}

impl JobStatus {
    /// Map a provider status string (any case) onto [`JobStatus`].
    ///
    /// Unknown values are treated as still running.
    pub fn from_provider(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "COMPLETED" | "COMPLETE" | "SUCCESS" | "SUCCEEDED" => JobStatus::Complete,
            "FAILED" | "FAILURE" | "ERROR" | "CANCELLED" | "CANCELED" => JobStatus::Failed,
            _ => JobStatus::InProgress,
        }
    }
}

/// Authoritative status of one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusReport {
    pub status: JobStatus,
    /// Present whenever `status` is `Complete`.
    pub artifact_url: Option<String>,
    pub duration_seconds: Option<f64>,
}

impl JobStatusReport {
    pub fn in_progress() -> Self {
        Self {
            status: JobStatus::InProgress,
            artifact_url: None,
            duration_seconds: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            status: JobStatus::Failed,
            artifact_url: None,
            duration_seconds: None,
        }
    }

    pub fn complete(artifact_url: impl Into<String>, duration_seconds: Option<f64>) -> Self {
        Self {
            status: JobStatus::Complete,
            artifact_url: Some(artifact_url.into()),
            duration_seconds,
        }
    }
}

/// One job-level notification decoded from a provider webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookNotice {
    pub job_id: JobId,
    /// Raw status string as sent by the provider.
    pub status: Option<String>,
    /// Provider's name for the kind of conversion that finished.
    pub conversion_kind: Option<String>,
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors surfaced by a [`GenerationProvider`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// The provider accepted the call but refused the request.
    #[error("Provider rejected request: {0}")]
    Rejected(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Provider request failed: {0}")]
    Request(String),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response body could not be interpreted.
    #[error("Unexpected provider response: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Stateless request/response access to the generation provider.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Submit a generation request using the caller's credential.
    async fn submit_job(
        &self,
        request: &SubmitJob,
        credential: &str,
    ) -> Result<SubmittedJob, ProviderError>;

    /// Fetch the current status of one job.
    async fn fetch_status(
        &self,
        job_id: &str,
        credential: &str,
    ) -> Result<JobStatusReport, ProviderError>;
}
