//! Fire-and-forget delivery of generation results.

use std::sync::Arc;

use saints_core::task::{Task, Track};
use saints_events::{EventBus, FailureReason, MusicEvent};

/// Publishes finished tracks onto the event bus.
///
/// There is no per-session routing: every subscriber receives every event
/// and filters by its own client task id. Publishing never waits on any
/// individual client.
pub struct NotificationDispatcher {
    bus: Arc<EventBus>,
    notify_failures: bool,
}

impl NotificationDispatcher {
    /// Create a dispatcher. With `notify_failures` off, failed and expired
    /// jobs produce no event at all.
    pub fn new(bus: Arc<EventBus>, notify_failures: bool) -> Self {
        Self {
            bus,
            notify_failures,
        }
    }

    /// Broadcast finished tracks for a client task.
    pub fn publish(&self, client_task_id: &str, tracks: Vec<Track>) {
        tracing::info!(
            client_task_id = %client_task_id,
            track_count = tracks.len(),
            subscribers = self.bus.subscriber_count(),
            "Publishing finished tracks",
        );
        self.bus.publish(MusicEvent::music_ready(client_task_id, tracks));
    }

    /// Broadcast that a job ended without tracks, if enabled.
    pub fn publish_failure(&self, task: &Task, reason: FailureReason) {
        if !self.notify_failures {
            return;
        }
        self.bus.publish(MusicEvent::generation_failed(
            task.client_task_id.clone(),
            task.job_id.clone(),
            reason,
        ));
    }
}
