//! Route definitions for song generation.
//!
//! ```text
//! POST   /generate-music                 generate_music
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/generate-music", post(generation::generate_music))
}
