//! Route definitions for lyric generation.
//!
//! ```text
//! POST   /generate-lyrics-claude         generate_lyrics_claude
//! POST   /generate-lyrics-openai         generate_lyrics_openai
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::lyrics;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-lyrics-claude", post(lyrics::generate_lyrics_claude))
        .route("/generate-lyrics-openai", post(lyrics::generate_lyrics_openai))
}
