use std::sync::Arc;

use async_trait::async_trait;
use beacon_core::{PeerId, ServerMessage};
use beacon_server::SignalOutput;
use tokio::sync::Mutex;

/// Mock SignalOutput that captures all outgoing messages for
/// verification.
#[derive(Clone, Default)]
pub struct MockSignalOutput {
    messages: Arc<Mutex<Vec<(PeerId, ServerMessage)>>>,
}

impl MockSignalOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages_for(&self, peer_id: &PeerId) -> Vec<ServerMessage> {
        self.messages
            .lock()
            .await
            .iter()
            .filter(|(id, _)| id == peer_id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub async fn count_for(&self, peer_id: &PeerId) -> usize {
        self.messages_for(peer_id).await.len()
    }

    pub async fn total(&self) -> usize {
        self.messages.lock().await.len()
    }

    /// Drain everything captured so far.
    pub async fn take(&self) -> Vec<(PeerId, ServerMessage)> {
        std::mem::take(&mut *self.messages.lock().await)
    }
}

#[async_trait]
impl SignalOutput for MockSignalOutput {
    async fn deliver(&self, peer_id: PeerId, msg: ServerMessage) {
        tracing::debug!(%peer_id, "[MockOutput] deliver");
        self.messages.lock().await.push((peer_id, msg));
    }
}
