use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saints_api::config::ServerConfig;
use saints_api::notifications::NotificationForwarder;
use saints_api::router::build_app_router;
use saints_api::state::AppState;
use saints_api::ws;
use saints_musicgpt::MusicGptApi;

/// Timeout for lyric generation calls, which can run long.
const LYRICS_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        webhook_url = ?config.webhook_url(),
        poll_interval_secs = config.poll_interval_secs,
        poll_max_lifetime_secs = config.poll_max_lifetime_secs,
        "Loaded server configuration",
    );

    // --- Upstream clients ---
    let provider = Arc::new(MusicGptApi::new(config.musicgpt_api_url.clone()));
    let http = reqwest::Client::builder()
        .timeout(LYRICS_HTTP_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client");

    // --- App state (event bus, tracker, WebSocket manager) ---
    let state = AppState::new(config.clone(), provider, http);
    let ws_manager = Arc::clone(&state.ws_manager);
    let tracker = Arc::clone(&state.tracker);

    // --- Background services ---
    let cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), cancel.clone());

    let forwarder = NotificationForwarder::new(Arc::clone(&ws_manager));
    let forwarder_handle = tokio::spawn(forwarder.run(state.event_bus.subscribe(), cancel.clone()));
    tracing::info!("Notification forwarder started");

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // WebSocket connections are closed as soon as the signal arrives so
    // they do not hold the graceful drain open.
    let shutdown_ws = Arc::clone(&ws_manager);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown_ws.shutdown_all().await;
        })
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let cleanup_timeout = Duration::from_secs(config.shutdown_timeout_secs);

    tracker.shutdown();
    let outstanding = tracker.outstanding().await;
    if outstanding > 0 {
        tracing::warn!(outstanding, "Dropping unfinished generation jobs");
    }

    cancel.cancel();
    let _ = tokio::time::timeout(cleanup_timeout, forwarder_handle).await;
    let _ = tokio::time::timeout(cleanup_timeout, heartbeat_handle).await;
    tracing::info!("Background services stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
/// JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "saints_api=debug,saints_tracker=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
