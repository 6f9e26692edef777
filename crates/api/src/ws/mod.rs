//! WebSocket infrastructure for pushing finished tracks to browsers.
//!
//! Provides connection management, heartbeat pings, and the HTTP upgrade
//! handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
