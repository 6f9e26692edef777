//! Task lifecycle and delivery engine.
//!
//! Correlates client generation requests with provider job ids, detects
//! completion through webhooks or polling, enforces a lifetime ceiling
//! per job, and hands finished tracks to the event bus exactly once.
//!
//! - [`TaskRegistry`] - outstanding jobs keyed by provider job id.
//! - [`CompletionDetector`] - webhook and poll paths funnelling into one
//!   atomic resolve.
//! - [`PollingScheduler`] - one cancellable timer task per job.
//! - [`NotificationDispatcher`] - fire-and-forget broadcast of results.
//! - [`TaskTracker`] - facade used by the HTTP layer.

pub mod completion;
pub mod dispatcher;
pub mod registry;
pub mod scheduler;
pub mod tracker;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use completion::{CompletionDetector, PollOutcome, WebhookOutcome};
pub use dispatcher::NotificationDispatcher;
pub use registry::TaskRegistry;
pub use scheduler::{PollPolicy, PollingScheduler};
pub use tracker::{GenerationRequest, Submission, TaskTracker, TrackerConfig, TrackerError};
