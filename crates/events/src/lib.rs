//! House of Saints event bus.
//!
//! - [`EventBus`] - in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`MusicEvent`] - generation lifecycle events delivered to browser
//!   sessions.

pub mod bus;

pub use bus::{EventBus, FailureReason, MusicEvent};
