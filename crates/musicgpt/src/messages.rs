//! MusicGPT response bodies and their interpretation.
//!
//! The provider is loose about numeric fields (durations arrive as numbers
//! or strings), so bodies are deserialized into permissive structs and
//! then converted into the core provider types.

use saints_core::provider::{JobStatus, JobStatusReport, ProviderError, SubmittedJob};
use serde::Deserialize;

/// Body returned by `POST /MusicAI`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub conversion_id_1: Option<String>,
    #[serde(default)]
    pub conversion_id_2: Option<String>,
    #[serde(default)]
    pub eta: Option<serde_json::Value>,
}

/// Body returned by `GET /byId`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversion: Option<Conversion>,
}

/// The `conversion` object inside a status response.
#[derive(Debug, Clone, Deserialize)]
pub struct Conversion {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conversion_path: Option<String>,
    #[serde(default)]
    pub conversion_duration: Option<serde_json::Value>,
}

impl SubmitResponse {
    /// Convert into a [`SubmittedJob`], or the provider's refusal.
    ///
    /// Each conversion id is one job. A success without any conversion id
    /// is unusable: status lookups only accept conversion ids.
    pub fn into_submitted(self) -> Result<SubmittedJob, ProviderError> {
        if !self.success {
            return Err(ProviderError::Rejected(
                self.message
                    .unwrap_or_else(|| "request rejected by MusicGPT".to_string()),
            ));
        }

        let job_ids: Vec<String> = [self.conversion_id_1, self.conversion_id_2]
            .into_iter()
            .flatten()
            .filter(|id| !id.is_empty())
            .collect();

        if job_ids.is_empty() {
            return Err(ProviderError::Parse(
                "submit response carried no conversion ids".into(),
            ));
        }

        Ok(SubmittedJob {
            job_ids,
            provider_task_id: self.task_id,
            eta_seconds: self.eta.as_ref().and_then(number_from_value),
        })
    }
}

impl StatusResponse {
    /// Convert into a [`JobStatusReport`].
    ///
    /// A `COMPLETED` conversion without an audio path is rejected so that
    /// a half-written status is never trusted as a finished artifact.
    pub fn into_report(self) -> Result<JobStatusReport, ProviderError> {
        if !self.success {
            return Err(ProviderError::Parse(self.message.unwrap_or_else(|| {
                "status response reported success=false".to_string()
            })));
        }

        let conversion = self
            .conversion
            .ok_or_else(|| ProviderError::Parse("status response missing conversion".into()))?;

        let status = conversion
            .status
            .as_deref()
            .map(JobStatus::from_provider)
            .unwrap_or(JobStatus::InProgress);

        match status {
            JobStatus::Complete => {
                let url = conversion
                    .conversion_path
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        ProviderError::Parse("completed conversion has no audio path".into())
                    })?;
                let duration = conversion
                    .conversion_duration
                    .as_ref()
                    .and_then(number_from_value);
                Ok(JobStatusReport::complete(url, duration))
            }
            JobStatus::Failed => Ok(JobStatusReport::failed()),
            JobStatus::InProgress => Ok(JobStatusReport::in_progress()),
        }
    }
}

/// Read a number that may be encoded as a JSON number or a numeric string.
pub fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a raw submit body.
pub fn parse_submit(body: &str) -> Result<SubmittedJob, ProviderError> {
    serde_json::from_str::<SubmitResponse>(body)
        .map_err(|e| ProviderError::Parse(e.to_string()))?
        .into_submitted()
}

/// Parse a raw status body.
pub fn parse_status(body: &str) -> Result<JobStatusReport, ProviderError> {
    serde_json::from_str::<StatusResponse>(body)
        .map_err(|e| ProviderError::Parse(e.to_string()))?
        .into_report()
}
