use std::sync::Arc;

use saints_core::provider::GenerationProvider;
use saints_events::EventBus;
use saints_lyrics::{AnthropicLyrics, OpenAiLyrics};
use saints_tracker::TaskTracker;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Event bus finished tracks are published on.
    pub event_bus: Arc<EventBus>,
    /// Lifecycle engine for submitted generation jobs.
    pub tracker: Arc<TaskTracker>,
    pub anthropic: Arc<AnthropicLyrics>,
    pub openai: Arc<OpenAiLyrics>,
}

impl AppState {
    /// Wire up state around a generation provider.
    ///
    /// `http` is shared by the lyric clients.
    pub fn new(
        config: ServerConfig,
        provider: Arc<dyn GenerationProvider>,
        http: reqwest::Client,
    ) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let tracker = Arc::new(TaskTracker::new(
            provider,
            Arc::clone(&event_bus),
            config.tracker_config(),
        ));
        let anthropic = Arc::new(AnthropicLyrics::new(
            http.clone(),
            config.anthropic_api_url.clone(),
            config.anthropic_model.clone(),
        ));
        let openai = Arc::new(OpenAiLyrics::new(
            http,
            config.openai_api_url.clone(),
            config.openai_model.clone(),
        ));

        Self {
            config: Arc::new(config),
            ws_manager: Arc::new(WsManager::new()),
            event_bus,
            tracker,
            anthropic,
            openai,
        }
    }
}
