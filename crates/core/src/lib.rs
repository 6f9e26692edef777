//! Shared domain types for the House of Saints music server.
//!
//! Holds the task and track models, the generation-provider contract,
//! submission validation, and the WebSocket message constants shared by
//! the tracker and API crates.

pub mod error;
pub mod generation;
pub mod music_events;
pub mod provider;
pub mod task;
pub mod types;
