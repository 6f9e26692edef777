//! MusicGPT REST client library.
//!
//! Provides typed response parsing, webhook payload decoding, and an HTTP
//! client implementing [`saints_core::provider::GenerationProvider`] for
//! the MusicGPT public API.

pub mod api;
pub mod messages;
pub mod webhook;

pub use api::{MusicGptApi, MusicGptApiError, DEFAULT_API_URL};
