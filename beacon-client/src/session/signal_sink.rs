use async_trait::async_trait;
use beacon_core::ClientMessage;

/// Outbound half of the signaling channel. The WebSocket glue (or an
/// in-memory loop in tests) implements this; the negotiation machine
/// only ever pushes messages into it.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send(&self, msg: ClientMessage);
}
