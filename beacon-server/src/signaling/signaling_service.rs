use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::Message;
use beacon_core::{IceServerConfig, PeerId, ServerMessage};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::relay::{RoomRelay, SignalOutput};

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Owns the outbound half of every live WebSocket and the ICE server
/// configuration advertised to clients. Cheap to clone.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
        }
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
    }

    pub fn send(&self, peer_id: PeerId, msg: &ServerMessage) {
        if let Some(peer) = self.inner.peers.get(&peer_id) {
            match serde_json::to_string(msg) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!(%peer_id, "failed to push WS message: {e}");
                    }
                }
                Err(e) => error!("failed to serialize server message: {e}"),
            }
        } else {
            warn!(%peer_id, "attempted to send signal to disconnected peer");
        }
    }
}

#[async_trait]
impl SignalOutput for SignalingService {
    async fn deliver(&self, peer_id: PeerId, msg: ServerMessage) {
        self.send(peer_id, &msg);
    }
}

/// Shared state for the axum router.
#[derive(Clone)]
pub struct SignalingState {
    pub service: SignalingService,
    pub relay: Arc<RoomRelay>,
}
