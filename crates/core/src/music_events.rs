//! WebSocket message type constants for generation lifecycle events.
//!
//! Used by the API crate's notification forwarder when broadcasting
//! tracker events to connected browser sessions.

/// Finished tracks are ready for a client task.
pub const MSG_TYPE_MUSIC_READY: &str = "music_ready";

/// A job failed or expired (only sent when failure notifications are on).
pub const MSG_TYPE_GENERATION_FAILED: &str = "generation_failed";
