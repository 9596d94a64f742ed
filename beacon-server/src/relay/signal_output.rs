use async_trait::async_trait;
use beacon_core::{PeerId, ServerMessage};

/// Delivery port the relay pushes outbound messages through, so the
/// relay itself never touches sockets. The WebSocket layer implements
/// this; tests substitute a capturing mock.
#[async_trait]
pub trait SignalOutput: Send + Sync {
    /// Deliver a message to one connection. Delivery to a vanished
    /// connection must be swallowed (logged at most), not surfaced.
    async fn deliver(&self, peer_id: PeerId, msg: ServerMessage);
}
