//! Tracking records for provider jobs and the tracks they produce.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{JobId, Timestamp};

/// Base URL for generated album artwork.
pub const ARTWORK_BASE_URL: &str = "https://source.unsplash.com/400x400/?music";

// ---------------------------------------------------------------------------
// TaskState
// ---------------------------------------------------------------------------

/// Lifecycle state of a tracked job.
///
/// Only `Pending` tasks live in the registry. The terminal states are
/// stamped on the task value handed back by the resolver that won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Pending,
    Resolved,
    Failed,
    Expired,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Resolved => "resolved",
            TaskState::Failed => "failed",
            TaskState::Expired => "expired",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NewTask / Task
// ---------------------------------------------------------------------------

/// Input for registering one provider job.
#[derive(Clone)]
pub struct NewTask {
    pub job_id: JobId,
    pub client_task_id: String,
    pub title: String,
    pub genre: String,
    /// Token required to query provider status for this job.
    pub credential: String,
    /// 1-based position of this job within its submission.
    pub variant: u32,
}

/// Tracking record for one provider job.
#[derive(Clone)]
pub struct Task {
    pub job_id: JobId,
    pub client_task_id: String,
    pub title: String,
    pub genre: String,
    pub credential: String,
    pub variant: u32,
    pub created_at: Timestamp,
    pub state: TaskState,
}

impl Task {
    /// Build a pending task from registration input, stamped now.
    pub fn from_new(new: NewTask) -> Self {
        Self {
            job_id: new.job_id,
            client_task_id: new.client_task_id,
            title: new.title,
            genre: new.genre,
            credential: new.credential,
            variant: new.variant,
            created_at: chrono::Utc::now(),
            state: TaskState::Pending,
        }
    }

    /// Seconds elapsed since registration.
    pub fn age_secs(&self) -> i64 {
        (chrono::Utc::now() - self.created_at).num_seconds()
    }

    /// Return the task with its terminal state set.
    pub fn with_state(mut self, state: TaskState) -> Self {
        self.state = state;
        self
    }

    /// Build the finished track for this task from a confirmed artifact.
    pub fn to_track(&self, audio_url: String, duration_seconds: Option<f64>) -> Track {
        Track {
            id: self.job_id.clone(),
            title: self.title.clone(),
            genre: self.genre.clone(),
            audio_url,
            duration_seconds,
            artwork_url: artwork_url(&self.genre, self.variant),
        }
    }
}

// The credential is an API key; keep it out of logs.
impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("job_id", &self.job_id)
            .field("client_task_id", &self.client_task_id)
            .field("title", &self.title)
            .field("genre", &self.genre)
            .field("credential", &"<redacted>")
            .field("variant", &self.variant)
            .field("created_at", &self.created_at)
            .field("state", &self.state)
            .finish()
    }
}

impl fmt::Debug for NewTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewTask")
            .field("job_id", &self.job_id)
            .field("client_task_id", &self.client_task_id)
            .field("title", &self.title)
            .field("genre", &self.genre)
            .field("credential", &"<redacted>")
            .field("variant", &self.variant)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// A finished track as delivered to browser clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Provider job id that produced this track.
    pub id: JobId,
    pub title: String,
    pub genre: String,
    pub audio_url: String,
    pub duration_seconds: Option<f64>,
    pub artwork_url: String,
}

/// Artwork URL for a genre. Variants after the first get a distinct
/// query suffix so two versions of one song show different images.
pub fn artwork_url(genre: &str, variant: u32) -> String {
    let genre = genre.trim().to_lowercase();
    if variant > 1 {
        format!("{ARTWORK_BASE_URL},{genre},{variant}")
    } else {
        format!("{ARTWORK_BASE_URL},{genre}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
