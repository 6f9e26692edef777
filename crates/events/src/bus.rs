//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`MusicEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use saints_core::music_events::{MSG_TYPE_GENERATION_FAILED, MSG_TYPE_MUSIC_READY};
use saints_core::task::Track;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// MusicEvent
// ---------------------------------------------------------------------------

/// Why a job ended without producing tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The provider reported the job as failed.
    Failed,
    /// The job outlived its polling lifetime.
    Expired,
}

/// A generation lifecycle event addressed to a client task.
///
/// Every subscriber sees every event; browser sessions filter by their
/// own `client_task_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MusicEvent {
    /// Finished tracks for one provider job.
    MusicReady {
        client_task_id: String,
        tracks: Vec<Track>,
        timestamp: DateTime<Utc>,
    },

    /// A job ended without tracks.
    GenerationFailed {
        client_task_id: String,
        job_id: String,
        reason: FailureReason,
        timestamp: DateTime<Utc>,
    },
}

impl MusicEvent {
    /// Build a `MusicReady` event stamped now.
    pub fn music_ready(client_task_id: impl Into<String>, tracks: Vec<Track>) -> Self {
        MusicEvent::MusicReady {
            client_task_id: client_task_id.into(),
            tracks,
            timestamp: Utc::now(),
        }
    }

    /// Build a `GenerationFailed` event stamped now.
    pub fn generation_failed(
        client_task_id: impl Into<String>,
        job_id: impl Into<String>,
        reason: FailureReason,
    ) -> Self {
        MusicEvent::GenerationFailed {
            client_task_id: client_task_id.into(),
            job_id: job_id.into(),
            reason,
            timestamp: Utc::now(),
        }
    }

    /// The client task this event is addressed to.
    pub fn client_task_id(&self) -> &str {
        match self {
            MusicEvent::MusicReady { client_task_id, .. }
            | MusicEvent::GenerationFailed { client_task_id, .. } => client_task_id,
        }
    }

    /// Message type tag used on the WebSocket wire.
    pub fn message_type(&self) -> &'static str {
        match self {
            MusicEvent::MusicReady { .. } => MSG_TYPE_MUSIC_READY,
            MusicEvent::GenerationFailed { .. } => MSG_TYPE_GENERATION_FAILED,
        }
    }

    /// The JSON frame sent to browser sessions.
    pub fn to_client_json(&self) -> serde_json::Value {
        match self {
            MusicEvent::MusicReady {
                client_task_id,
                tracks,
                ..
            } => serde_json::json!({
                "type": self.message_type(),
                "clientTaskId": client_task_id,
                "tracks": tracks,
            }),
            MusicEvent::GenerationFailed {
                client_task_id,
                job_id,
                reason,
                ..
            } => serde_json::json!({
                "type": self.message_type(),
                "clientTaskId": client_task_id,
                "jobId": job_id,
                "reason": reason,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`MusicEvent`].
///
/// # Usage
///
/// ```rust
/// use saints_events::bus::{EventBus, MusicEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(MusicEvent::music_ready("abc", Vec::new()));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<MusicEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Never blocks. If there are no active subscribers the event is
    /// dropped; there is no offline delivery.
    pub fn publish(&self, event: MusicEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("Event published with no subscribers");
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<MusicEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
