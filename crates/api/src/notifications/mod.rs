//! Delivery of bus events to connected browsers.
//!
//! The [`NotificationForwarder`] subscribes to the event bus and relays
//! every event to every WebSocket connection as a JSON text frame.

pub mod forwarder;

pub use forwarder::NotificationForwarder;
