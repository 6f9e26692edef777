//! Scripted in-memory [`GenerationProvider`] for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use saints_core::provider::{
    GenerationProvider, JobStatusReport, ProviderError, SubmitJob, SubmittedJob,
};

type StatusScript = VecDeque<Result<JobStatusReport, ProviderError>>;

/// Provider fake with per-job scripted status responses.
///
/// Each `fetch_status` call pops the next scripted result for that job;
/// once a job's script runs out it reports `InProgress` forever.
pub struct ScriptedProvider {
    submit_result: Mutex<Result<SubmittedJob, ProviderError>>,
    submissions: Mutex<Vec<(SubmitJob, String)>>,
    statuses: Mutex<HashMap<String, StatusScript>>,
    fetch_calls: Mutex<HashMap<String, usize>>,
    fetch_delay: Mutex<Option<Duration>>,
}

impl ScriptedProvider {
    /// A provider whose submissions return the given job ids.
    pub fn with_jobs(job_ids: &[&str]) -> Self {
        Self::with_submit_result(Ok(SubmittedJob {
            job_ids: job_ids.iter().map(|id| id.to_string()).collect(),
            provider_task_id: Some("provider-task".into()),
            eta_seconds: Some(90.0),
        }))
    }

    /// A provider whose submissions return `result`.
    pub fn with_submit_result(result: Result<SubmittedJob, ProviderError>) -> Self {
        Self {
            submit_result: Mutex::new(result),
            submissions: Mutex::new(Vec::new()),
            statuses: Mutex::new(HashMap::new()),
            fetch_calls: Mutex::new(HashMap::new()),
            fetch_delay: Mutex::new(None),
        }
    }

    /// Queue the next status result for `job_id`.
    pub fn push_status(&self, job_id: &str, result: Result<JobStatusReport, ProviderError>) {
        self.statuses
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .push_back(result);
    }

    /// Make every `fetch_status` call take `delay` before answering.
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    /// How many times `fetch_status` was called for `job_id`.
    pub fn fetch_count(&self, job_id: &str) -> usize {
        self.fetch_calls
            .lock()
            .unwrap()
            .get(job_id)
            .copied()
            .unwrap_or(0)
    }

    /// Requests received by `submit_job`, with the credential used.
    pub fn submissions(&self) -> Vec<(SubmitJob, String)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn submit_job(
        &self,
        request: &SubmitJob,
        credential: &str,
    ) -> Result<SubmittedJob, ProviderError> {
        self.submissions
            .lock()
            .unwrap()
            .push((request.clone(), credential.to_string()));
        self.submit_result.lock().unwrap().clone()
    }

    async fn fetch_status(
        &self,
        job_id: &str,
        _credential: &str,
    ) -> Result<JobStatusReport, ProviderError> {
        *self
            .fetch_calls
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default() += 1;

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.statuses
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(JobStatusReport::in_progress()))
    }
}
