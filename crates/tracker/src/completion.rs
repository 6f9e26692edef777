//! Completion detection for tracked jobs.
//!
//! Two triggers decide that a job is finished: a provider webhook and the
//! job's own polling timer. Both end in [`TaskRegistry::resolve`], and
//! only the caller that gets the task back from it may publish anything.
//! The loser sees `None` and does nothing.
//!
//! Provider errors never escape this module. A failed status fetch is
//! logged and treated as one missed attempt; the job stays pending.

use std::sync::Arc;

use saints_core::generation::WebhookStatus;
use saints_core::provider::{GenerationProvider, JobStatus, JobStatusReport, WebhookNotice};
use saints_core::task::TaskState;
use saints_events::FailureReason;

use crate::dispatcher::NotificationDispatcher;
use crate::registry::TaskRegistry;

/// Result of one poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Still running, or the attempt failed transiently. Keep polling.
    Continue,
    /// This tick resolved the job and published its track.
    Delivered,
    /// This tick resolved the job as failed.
    Failed,
    /// The job was already resolved elsewhere.
    Gone,
}

impl PollOutcome {
    /// Whether the job's timer should stop after this outcome.
    pub fn is_final(self) -> bool {
        !matches!(self, PollOutcome::Continue)
    }
}

/// Result of handling one webhook notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// No pending task for this job id (duplicate, stale, or expired).
    Unknown,
    /// The status was neither success nor failure.
    Ignored,
    /// The job is not confirmed finished yet; polling continues.
    Pending,
    /// This webhook resolved the job and published its track.
    Delivered,
    /// This webhook resolved the job as failed.
    Failed,
    /// The poll path resolved the job while this webhook was confirming.
    AlreadyResolved,
}

impl WebhookOutcome {
    /// Whether the job no longer needs a polling timer.
    pub fn is_settled(self) -> bool {
        !matches!(self, WebhookOutcome::Pending | WebhookOutcome::Ignored)
    }
}

/// Which side of the resolve race a caller ended up on.
enum Settle {
    Won,
    Lost,
}

/// Funnels webhook and poll triggers into a single resolution.
pub struct CompletionDetector {
    registry: Arc<TaskRegistry>,
    provider: Arc<dyn GenerationProvider>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl CompletionDetector {
    pub fn new(
        registry: Arc<TaskRegistry>,
        provider: Arc<dyn GenerationProvider>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            registry,
            provider,
            dispatcher,
        }
    }

    /// Handle one job-level webhook notice.
    ///
    /// Webhook bodies are not trusted for the artifact URL; a success
    /// claim is confirmed with a status fetch before resolving.
    pub async fn handle_webhook(&self, notice: &WebhookNotice) -> WebhookOutcome {
        let job_id = notice.job_id.as_str();

        let Some(task) = self.registry.lookup(job_id).await else {
            tracing::debug!(
                job_id,
                status = ?notice.status,
                "Webhook for unknown or already-resolved job, discarding",
            );
            return WebhookOutcome::Unknown;
        };

        match WebhookStatus::parse(notice.status.as_deref()) {
            WebhookStatus::Other => {
                tracing::debug!(
                    job_id,
                    status = ?notice.status,
                    conversion_kind = ?notice.conversion_kind,
                    "Webhook status is not terminal, ignoring",
                );
                WebhookOutcome::Ignored
            }
            WebhookStatus::Failed => match self.settle_failure(job_id).await {
                Settle::Won => WebhookOutcome::Failed,
                Settle::Lost => WebhookOutcome::AlreadyResolved,
            },
            WebhookStatus::Succeeded => {
                let report = match self.provider.fetch_status(job_id, &task.credential).await {
                    Ok(report) => report,
                    Err(e) => {
                        tracing::warn!(
                            job_id,
                            error = %e,
                            "Failed to confirm webhook completion, polling will retry",
                        );
                        return WebhookOutcome::Pending;
                    }
                };

                match report.status {
                    JobStatus::Complete => match self.settle_success(job_id, report).await {
                        Some(Settle::Won) => WebhookOutcome::Delivered,
                        Some(Settle::Lost) => WebhookOutcome::AlreadyResolved,
                        None => WebhookOutcome::Pending,
                    },
                    JobStatus::Failed => match self.settle_failure(job_id).await {
                        Settle::Won => WebhookOutcome::Failed,
                        Settle::Lost => WebhookOutcome::AlreadyResolved,
                    },
                    JobStatus::InProgress => {
                        tracing::debug!(job_id, "Webhook claimed completion before status did");
                        WebhookOutcome::Pending
                    }
                }
            }
        }
    }

    /// Run one poll attempt for a job.
    pub async fn poll_tick(&self, job_id: &str) -> PollOutcome {
        // Re-check before spending a provider call on a resolved job.
        let Some(task) = self.registry.lookup(job_id).await else {
            return PollOutcome::Gone;
        };

        let report = match self.provider.fetch_status(job_id, &task.credential).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(job_id, error = %e, "Status poll failed, will retry");
                return PollOutcome::Continue;
            }
        };

        match report.status {
            JobStatus::InProgress => {
                tracing::debug!(job_id, age_secs = task.age_secs(), "Job still in progress");
                PollOutcome::Continue
            }
            JobStatus::Complete => match self.settle_success(job_id, report).await {
                Some(Settle::Won) => PollOutcome::Delivered,
                Some(Settle::Lost) => PollOutcome::Gone,
                None => PollOutcome::Continue,
            },
            JobStatus::Failed => match self.settle_failure(job_id).await {
                Settle::Won => PollOutcome::Failed,
                Settle::Lost => PollOutcome::Gone,
            },
        }
    }

    /// Give up on a job that outlived its polling lifetime.
    ///
    /// Returns `true` if the job was still pending and is now expired.
    pub async fn expire(&self, job_id: &str) -> bool {
        let Some(task) = self.registry.resolve(job_id).await else {
            return false;
        };
        let task = task.with_state(TaskState::Expired);

        tracing::warn!(
            job_id,
            client_task_id = %task.client_task_id,
            age_secs = task.age_secs(),
            state = %task.state,
            "Generation exceeded polling lifetime, giving up",
        );
        self.dispatcher.publish_failure(&task, FailureReason::Expired);
        true
    }

    // ---- private helpers ----

    /// Resolve a confirmed-complete job and publish its track.
    ///
    /// Returns `None` when the report has no artifact URL; that is treated
    /// like a transient fetch error and the job stays pending.
    async fn settle_success(&self, job_id: &str, report: JobStatusReport) -> Option<Settle> {
        let Some(audio_url) = report.artifact_url else {
            tracing::warn!(job_id, "Completed status without an artifact URL, will retry");
            return None;
        };

        let Some(task) = self.registry.resolve(job_id).await else {
            tracing::debug!(job_id, "Job already resolved by the other path, discarding result");
            return Some(Settle::Lost);
        };
        let task = task.with_state(TaskState::Resolved);

        let track = task.to_track(audio_url, report.duration_seconds);
        tracing::info!(
            job_id,
            client_task_id = %task.client_task_id,
            audio_url = %track.audio_url,
            age_secs = task.age_secs(),
            "Generation complete",
        );
        self.dispatcher.publish(&task.client_task_id, vec![track]);
        Some(Settle::Won)
    }

    /// Resolve a job the provider reported as failed.
    async fn settle_failure(&self, job_id: &str) -> Settle {
        let Some(task) = self.registry.resolve(job_id).await else {
            return Settle::Lost;
        };
        let task = task.with_state(TaskState::Failed);

        tracing::warn!(
            job_id,
            client_task_id = %task.client_task_id,
            state = %task.state,
            "Provider reported generation failure",
        );
        self.dispatcher.publish_failure(&task, FailureReason::Failed);
        Settle::Won
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use saints_core::provider::ProviderError;
    use saints_core::task::NewTask;
    use saints_events::{EventBus, MusicEvent};
    use tokio::sync::broadcast;

    use super::*;
    use crate::testing::ScriptedProvider;

    struct Harness {
        registry: Arc<TaskRegistry>,
        provider: Arc<ScriptedProvider>,
        detector: CompletionDetector,
        rx: broadcast::Receiver<MusicEvent>,
    }

    fn harness(notify_failures: bool) -> Harness {
        let registry = Arc::new(TaskRegistry::new());
        let provider = Arc::new(ScriptedProvider::with_jobs(&["J1"]));
        let bus = Arc::new(EventBus::default());
        let rx = bus.subscribe();
        let dispatcher = Arc::new(NotificationDispatcher::new(bus, notify_failures));
        let detector = CompletionDetector::new(
            Arc::clone(&registry),
            provider.clone() as Arc<dyn GenerationProvider>,
            dispatcher,
        );
        Harness {
            registry,
            provider,
            detector,
            rx,
        }
    }

    async fn register(registry: &TaskRegistry, job_id: &str) {
        registry
            .register(NewTask {
                job_id: job_id.into(),
                client_task_id: "abc".into(),
                title: "Hymn".into(),
                genre: "Gospel".into(),
                credential: "key".into(),
                variant: 1,
            })
            .await;
    }

    fn notice(job_id: &str, status: &str) -> WebhookNotice {
        WebhookNotice {
            job_id: job_id.into(),
            status: Some(status.into()),
            conversion_kind: Some("audio_generation".into()),
        }
    }

    #[tokio::test]
    async fn poll_in_progress_continues() {
        let mut h = harness(false);
        register(&h.registry, "J1").await;

        assert_eq!(h.detector.poll_tick("J1").await, PollOutcome::Continue);
        assert!(h.registry.lookup("J1").await.is_some());
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn poll_complete_delivers_once() {
        let mut h = harness(false);
        register(&h.registry, "J1").await;
        h.provider
            .push_status("J1", Ok(JobStatusReport::complete("http://x/a.wav", Some(200.0))));

        assert_eq!(h.detector.poll_tick("J1").await, PollOutcome::Delivered);
        assert!(h.registry.lookup("J1").await.is_none());

        let event = h.rx.try_recv().expect("one event");
        assert_matches!(event, MusicEvent::MusicReady { ref client_task_id, ref tracks, .. }
            if client_task_id == "abc" && tracks[0].id == "J1" && tracks[0].audio_url == "http://x/a.wav");
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn poll_on_resolved_job_skips_provider() {
        let h = harness(false);

        assert_eq!(h.detector.poll_tick("J1").await, PollOutcome::Gone);
        assert_eq!(h.provider.fetch_count("J1"), 0);
    }

    #[tokio::test]
    async fn poll_failure_resolves_silently() {
        let mut h = harness(false);
        register(&h.registry, "J1").await;
        h.provider.push_status("J1", Ok(JobStatusReport::failed()));

        assert_eq!(h.detector.poll_tick("J1").await, PollOutcome::Failed);
        assert_eq!(h.registry.count().await, 0);
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn poll_transport_error_is_transient() {
        let mut h = harness(false);
        register(&h.registry, "J1").await;
        h.provider
            .push_status("J1", Err(ProviderError::Request("connection reset".into())));

        assert_eq!(h.detector.poll_tick("J1").await, PollOutcome::Continue);
        assert!(h.registry.lookup("J1").await.is_some());
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn complete_without_url_is_transient() {
        let h = harness(false);
        register(&h.registry, "J1").await;
        h.provider.push_status(
            "J1",
            Ok(JobStatusReport {
                status: JobStatus::Complete,
                artifact_url: None,
                duration_seconds: None,
            }),
        );

        assert_eq!(h.detector.poll_tick("J1").await, PollOutcome::Continue);
        assert!(h.registry.lookup("J1").await.is_some());
    }

    #[tokio::test]
    async fn webhook_for_unknown_job_is_discarded() {
        let mut h = harness(false);
        register(&h.registry, "J1").await;

        let outcome = h.detector.handle_webhook(&notice("Z9", "completed")).await;

        assert_eq!(outcome, WebhookOutcome::Unknown);
        assert_eq!(h.registry.count().await, 1);
        assert_eq!(h.provider.fetch_count("Z9"), 0);
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn webhook_success_is_confirmed_then_delivered() {
        let mut h = harness(false);
        register(&h.registry, "J1").await;
        h.provider
            .push_status("J1", Ok(JobStatusReport::complete("http://x/a.wav", None)));

        let outcome = h.detector.handle_webhook(&notice("J1", "COMPLETED")).await;

        assert_eq!(outcome, WebhookOutcome::Delivered);
        assert_eq!(h.provider.fetch_count("J1"), 1);
        assert!(h.rx.try_recv().is_ok());
        assert_eq!(h.registry.count().await, 0);
    }

    #[tokio::test]
    async fn webhook_success_not_yet_confirmed_stays_pending() {
        let mut h = harness(false);
        register(&h.registry, "J1").await;

        let outcome = h.detector.handle_webhook(&notice("J1", "completed")).await;

        assert_eq!(outcome, WebhookOutcome::Pending);
        assert!(h.registry.lookup("J1").await.is_some());
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn webhook_fetch_error_stays_pending() {
        let h = harness(false);
        register(&h.registry, "J1").await;
        h.provider.push_status(
            "J1",
            Err(ProviderError::Api {
                status: 502,
                body: "bad gateway".into(),
            }),
        );

        let outcome = h.detector.handle_webhook(&notice("J1", "completed")).await;
        assert_eq!(outcome, WebhookOutcome::Pending);
        assert!(h.registry.lookup("J1").await.is_some());
    }

    #[tokio::test]
    async fn webhook_failure_resolves_without_fetch() {
        let mut h = harness(false);
        register(&h.registry, "J1").await;

        let outcome = h.detector.handle_webhook(&notice("J1", "failed")).await;

        assert_eq!(outcome, WebhookOutcome::Failed);
        assert_eq!(h.provider.fetch_count("J1"), 0);
        assert_eq!(h.registry.count().await, 0);
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn webhook_progress_status_is_ignored() {
        let h = harness(false);
        register(&h.registry, "J1").await;

        let outcome = h.detector.handle_webhook(&notice("J1", "processing")).await;

        assert_eq!(outcome, WebhookOutcome::Ignored);
        assert!(!outcome.is_settled());
        assert!(h.registry.lookup("J1").await.is_some());
    }

    #[tokio::test]
    async fn expire_resolves_once() {
        let mut h = harness(false);
        register(&h.registry, "J1").await;

        assert!(h.detector.expire("J1").await);
        assert!(!h.detector.expire("J1").await);
        assert_eq!(h.registry.count().await, 0);
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn expire_publishes_failure_when_enabled() {
        let mut h = harness(true);
        register(&h.registry, "J1").await;

        assert!(h.detector.expire("J1").await);

        let event = h.rx.try_recv().expect("failure event");
        assert_matches!(
            event,
            MusicEvent::GenerationFailed { reason: FailureReason::Expired, .. }
        );
    }

    #[tokio::test]
    async fn late_webhook_after_poll_delivery_publishes_nothing() {
        let mut h = harness(false);
        register(&h.registry, "J1").await;
        h.provider
            .push_status("J1", Ok(JobStatusReport::complete("http://x/a.wav", None)));

        assert_eq!(h.detector.poll_tick("J1").await, PollOutcome::Delivered);
        assert!(h.rx.try_recv().is_ok());

        let outcome = h.detector.handle_webhook(&notice("J1", "completed")).await;
        assert_eq!(outcome, WebhookOutcome::Unknown);
        assert!(h.rx.try_recv().is_err());
    }
}
