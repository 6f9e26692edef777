//! Facade over the lifecycle components, used by the HTTP layer.

use std::sync::Arc;

use saints_core::error::CoreError;
use saints_core::generation::{default_title, validate_submission, variant_title};
use saints_core::provider::{GenerationProvider, ProviderError, SubmitJob, WebhookNotice};
use saints_core::task::{NewTask, Task};
use saints_core::types::JobId;
use saints_events::EventBus;

use crate::completion::{CompletionDetector, WebhookOutcome};
use crate::dispatcher::NotificationDispatcher;
use crate::registry::TaskRegistry;
use crate::scheduler::{PollPolicy, PollingScheduler};

/// Runtime knobs for the tracker.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerConfig {
    pub policy: PollPolicy,
    /// Publish `generation_failed` events for failed and expired jobs.
    pub notify_failures: bool,
}

/// A client's request to generate a song.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: String,
    pub lyrics: String,
    pub make_instrumental: bool,
    /// Display title; derived from the style when absent.
    pub title: Option<String>,
    pub client_task_id: String,
    /// The caller's provider API key.
    pub credential: String,
}

/// What the provider accepted for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub job_ids: Vec<JobId>,
    pub provider_task_id: Option<String>,
    pub eta_seconds: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Ties registry, completion detection, polling, and delivery together.
pub struct TaskTracker {
    registry: Arc<TaskRegistry>,
    provider: Arc<dyn GenerationProvider>,
    detector: Arc<CompletionDetector>,
    scheduler: Arc<PollingScheduler>,
    config: TrackerConfig,
}

impl TaskTracker {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        bus: Arc<EventBus>,
        config: TrackerConfig,
    ) -> Self {
        let registry = Arc::new(TaskRegistry::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(bus, config.notify_failures));
        let detector = Arc::new(CompletionDetector::new(
            Arc::clone(&registry),
            Arc::clone(&provider),
            dispatcher,
        ));
        let scheduler = Arc::new(PollingScheduler::new(Arc::clone(&detector)));

        Self {
            registry,
            provider,
            detector,
            scheduler,
            config,
        }
    }

    /// Validate and submit a request, then track every job it produced.
    ///
    /// Every returned job is registered before its timer starts, and a
    /// timer is started even when a webhook is expected. Nothing is
    /// registered if the provider refuses the request.
    pub async fn submit(
        &self,
        request: GenerationRequest,
        webhook_url: Option<String>,
    ) -> Result<Submission, TrackerError> {
        validate_submission(
            &request.prompt,
            &request.style,
            &request.lyrics,
            &request.client_task_id,
            &request.credential,
        )?;

        let job = SubmitJob {
            prompt: request.prompt.trim().to_string(),
            music_style: request.style.trim().to_string(),
            lyrics: request.lyrics.trim().to_string(),
            make_instrumental: request.make_instrumental,
            webhook_url,
        };

        let submitted = match self.provider.submit_job(&job, &request.credential).await {
            Ok(submitted) => submitted,
            Err(e) => {
                tracing::warn!(
                    client_task_id = %request.client_task_id,
                    error = %e,
                    "Provider refused generation request",
                );
                return Err(e.into());
            }
        };

        let base_title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_title(&request.style));
        let total = submitted.job_ids.len();

        for (index, job_id) in submitted.job_ids.iter().enumerate() {
            let variant = index as u32 + 1;
            self.registry
                .register(NewTask {
                    job_id: job_id.clone(),
                    client_task_id: request.client_task_id.clone(),
                    title: variant_title(&base_title, variant, total),
                    genre: job.music_style.clone(),
                    credential: request.credential.clone(),
                    variant,
                })
                .await;
            self.scheduler.start(job_id, self.config.policy);
        }

        tracing::info!(
            client_task_id = %request.client_task_id,
            job_ids = ?submitted.job_ids,
            push = job.webhook_url.is_some(),
            "Generation jobs tracked",
        );

        Ok(Submission {
            job_ids: submitted.job_ids,
            provider_task_id: submitted.provider_task_id,
            eta_seconds: submitted.eta_seconds,
        })
    }

    /// Apply one webhook notice. Unknown job ids are not an error.
    pub async fn handle_webhook(&self, notice: &WebhookNotice) -> WebhookOutcome {
        let outcome = self.detector.handle_webhook(notice).await;
        if outcome.is_settled() {
            self.scheduler.stop(&notice.job_id);
        }
        outcome
    }

    /// Number of jobs still awaiting completion.
    pub async fn outstanding(&self) -> usize {
        self.registry.count().await
    }

    /// Number of live polling timers.
    pub fn active_timers(&self) -> usize {
        self.scheduler.active_count()
    }

    pub async fn lookup(&self, job_id: &str) -> Option<Task> {
        self.registry.lookup(job_id).await
    }

    /// Stop all polling. Outstanding tasks stay in the registry and are
    /// lost with the process.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}
