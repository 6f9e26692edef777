//! Event bus to WebSocket relay.

use std::sync::Arc;

use axum::extract::ws::Message;
use saints_events::MusicEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::ws::WsManager;

/// Relays music events to all WebSocket clients.
///
/// There is no per-client routing. Each browser filters incoming frames
/// by the `clientTaskId` it submitted.
pub struct NotificationForwarder {
    ws_manager: Arc<WsManager>,
}

impl NotificationForwarder {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the forwarding loop.
    ///
    /// Exits when `cancel` fires or the bus is closed. A lagging receiver
    /// loses the skipped events; there is no replay.
    pub async fn run(self, mut receiver: broadcast::Receiver<MusicEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification forwarder stopping");
                    break;
                }
                result = receiver.recv() => match result {
                    Ok(event) => self.forward(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Notification forwarder lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, notification forwarder shutting down");
                        break;
                    }
                },
            }
        }
    }

    async fn forward(&self, event: &MusicEvent) {
        let frame = event.to_client_json().to_string();
        let delivered = self.ws_manager.broadcast(Message::Text(frame.into())).await;
        tracing::debug!(
            event_type = event.message_type(),
            client_task_id = %event.client_task_id(),
            delivered,
            "Event forwarded to WebSocket clients",
        );
    }
}
