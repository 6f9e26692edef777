//! Per-job polling timers.
//!
//! Every tracked job gets its own spawned task that polls the provider on
//! a fixed cadence and gives up once the job's lifetime runs out. Each
//! timer owns a [`CancellationToken`] derived from the scheduler's master
//! token, so a single job can be stopped without touching the others and
//! shutdown stops all of them at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use saints_core::types::JobId;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::completion::CompletionDetector;

/// Default spacing between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default ceiling on how long a job is polled before it expires.
pub const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(600);

/// Polling cadence and lifetime ceiling for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_lifetime: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_lifetime: Duration) -> Self {
        Self {
            interval,
            max_lifetime,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_LIFETIME)
    }
}

struct TimerHandle {
    id: u64,
    cancel: CancellationToken,
}

/// Owns one cancellable polling task per outstanding job.
pub struct PollingScheduler {
    detector: Arc<CompletionDetector>,
    timers: Mutex<HashMap<JobId, TimerHandle>>,
    next_id: AtomicU64,
    cancel: CancellationToken,
}

impl PollingScheduler {
    pub fn new(detector: Arc<CompletionDetector>) -> Self {
        Self {
            detector,
            timers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Start polling `job_id` under `policy`.
    ///
    /// The first poll happens one interval after start. Starting a job
    /// that already has a timer replaces and cancels the old one.
    pub fn start(self: &Arc<Self>, job_id: &str, policy: PollPolicy) {
        if self.cancel.is_cancelled() {
            tracing::warn!(job_id, "Scheduler is shut down, not starting timer");
            return;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = self.cancel.child_token();

        let previous = self.lock_timers().insert(
            job_id.to_string(),
            TimerHandle {
                id,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            tracing::debug!(job_id, "Replacing existing polling timer");
            previous.cancel.cancel();
        }

        tracing::debug!(
            job_id,
            interval_secs = policy.interval.as_secs(),
            max_lifetime_secs = policy.max_lifetime.as_secs(),
            "Polling timer started",
        );

        let scheduler = Arc::clone(self);
        let job_id = job_id.to_string();
        tokio::spawn(async move {
            scheduler.run_timer(&job_id, id, policy, cancel).await;
            scheduler.forget(&job_id, id);
        });
    }

    /// Stop polling `job_id`. Safe to call any number of times, including
    /// for jobs that never had a timer.
    pub fn stop(&self, job_id: &str) {
        if let Some(handle) = self.lock_timers().remove(job_id) {
            handle.cancel.cancel();
            tracing::debug!(job_id, "Polling timer stopped");
        }
    }

    /// Number of live timers.
    pub fn active_count(&self) -> usize {
        self.lock_timers().len()
    }

    /// Cancel every timer and refuse new ones.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        let drained = self.lock_timers().drain().count();
        tracing::info!(timers = drained, "Polling scheduler shut down");
    }

    // ---- private helpers ----

    async fn run_timer(&self, job_id: &str, id: u64, policy: PollPolicy, cancel: CancellationToken) {
        let start = Instant::now();
        let mut ticker = tokio::time::interval_at(start + policy.interval, policy.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let deadline = start + policy.max_lifetime;
        let lifetime = tokio::time::sleep_until(deadline);
        tokio::pin!(lifetime);

        let mut attempts: u32 = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(job_id, timer_id = id, attempts, "Polling timer cancelled");
                    break;
                }
                _ = &mut lifetime => {
                    self.detector.expire(job_id).await;
                    break;
                }
                _ = ticker.tick() => {
                    attempts += 1;
                    // The deadline still applies while a status fetch is in flight.
                    let poll = tokio::time::timeout_at(deadline, self.detector.poll_tick(job_id));
                    let outcome = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            tracing::debug!(job_id, timer_id = id, attempts, "Polling timer cancelled mid-poll");
                            break;
                        }
                        result = poll => result,
                    };
                    match outcome {
                        Ok(outcome) if outcome.is_final() => {
                            tracing::debug!(job_id, attempts, ?outcome, "Polling finished");
                            break;
                        }
                        Ok(_) => {}
                        Err(_) => {
                            tracing::debug!(job_id, attempts, "Lifetime ran out during a status poll");
                            self.detector.expire(job_id).await;
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Drop the timer entry if it still belongs to timer `id`.
    fn forget(&self, job_id: &str, id: u64) {
        let mut timers = self.lock_timers();
        if timers.get(job_id).is_some_and(|handle| handle.id == id) {
            timers.remove(job_id);
        }
    }

    fn lock_timers(&self) -> std::sync::MutexGuard<'_, HashMap<JobId, TimerHandle>> {
        // No code panics while holding this lock.
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
