use std::collections::HashMap;
use std::sync::Arc;

use beacon_core::{ClientMessage, PeerId, RoomId, ServerMessage, UserId};
use tracing::{debug, info, warn};

use crate::session::{NegotiationError, NegotiationState, PeerEvent, PeerNegotiator, SignalSink};
use crate::transport::{TransportEvent, TransportFactory};

/// One client's view of a room: a negotiation machine per remote peer,
/// fed from the signaling stream and from local transport events.
///
/// The session processes one message at a time, so each machine sees
/// its events in arrival order.
pub struct RoomSession<F: TransportFactory> {
    local_id: PeerId,
    room: RoomId,
    user: Option<UserId>,
    factory: F,
    signals: Arc<dyn SignalSink>,
    peers: HashMap<PeerId, PeerNegotiator<F::Transport>>,
}

impl<F: TransportFactory> RoomSession<F> {
    /// `local_id` is the identifier announced in the coordinator's
    /// welcome message.
    pub fn new(
        local_id: PeerId,
        room: RoomId,
        user: Option<UserId>,
        factory: F,
        signals: Arc<dyn SignalSink>,
    ) -> Self {
        Self {
            local_id,
            room,
            user,
            factory,
            signals,
            peers: HashMap::new(),
        }
    }

    pub fn local_id(&self) -> PeerId {
        self.local_id
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn peer_ids(&self) -> Vec<PeerId> {
        self.peers.keys().copied().collect()
    }

    pub fn peer_state(&self, remote: &PeerId) -> Option<NegotiationState> {
        self.peers.get(remote).map(|n| n.state())
    }

    /// Announce the room to the coordinator.
    pub async fn join(&self) {
        self.signals
            .send(ClientMessage::Join {
                room: self.room.clone(),
                user: self.user.clone(),
            })
            .await;
    }

    /// Apply one signaling message.
    pub async fn handle_server_message(
        &mut self,
        msg: ServerMessage,
    ) -> Result<(), NegotiationError> {
        match msg {
            ServerMessage::Welcome { .. } => {
                // Consumed by the embedding before the session exists.
                debug!("ignoring welcome on an established session");
                Ok(())
            }
            ServerMessage::RoomJoined { peers, .. } => {
                // Members that were present before us initiate; we only
                // prepare a machine for each and wait for their offers.
                for peer in peers {
                    self.ensure_peer(peer.peer_id).await?;
                }
                Ok(())
            }
            ServerMessage::PeerJoined { peer_id, user } => {
                info!(remote = %peer_id, user = ?user, "peer joined, initiating call");
                self.ensure_peer(peer_id).await?;
                self.dispatch(peer_id, PeerEvent::CallRequested).await
            }
            ServerMessage::PeerLeft { peer_id } => {
                if let Some(negotiator) = self.peers.remove(&peer_id) {
                    info!(remote = %peer_id, "peer left, tearing down");
                    negotiator.close().await;
                }
                Ok(())
            }
            ServerMessage::Offer { from, sdp } => {
                self.ensure_peer(from).await?;
                self.dispatch(from, PeerEvent::RemoteOffer { sdp }).await
            }
            ServerMessage::Answer { from, sdp } => {
                self.dispatch(from, PeerEvent::RemoteAnswer { sdp })
                    .await
            }
            ServerMessage::IceCandidate { from, candidate } => {
                // A candidate for a peer we no longer (or never) track
                // belongs to a torn-down connection; drop it silently.
                self.dispatch(from, PeerEvent::RemoteCandidate(candidate))
                    .await
            }
            ServerMessage::NegoNeeded { from, sdp } => {
                self.dispatch(from, PeerEvent::RemoteRenegotiationOffer { sdp })
                    .await
            }
            ServerMessage::NegoDone { from, sdp } => {
                self.dispatch(from, PeerEvent::RemoteRenegotiationAnswer { sdp })
                    .await
            }
        }
    }

    /// Apply one event surfaced by the transport for `remote`.
    pub async fn handle_transport_event(
        &mut self,
        remote: PeerId,
        event: TransportEvent,
    ) -> Result<(), NegotiationError> {
        match event {
            TransportEvent::LocalCandidate(candidate) => {
                self.dispatch(remote, PeerEvent::LocalCandidate(candidate))
                    .await
            }
            TransportEvent::NegotiationNeeded => {
                self.dispatch(remote, PeerEvent::NegotiationNeeded)
                    .await
            }
            TransportEvent::Disconnected => {
                if let Some(negotiator) = self.peers.remove(&remote) {
                    warn!(remote = %remote, "transport lost, tearing down");
                    negotiator.close().await;
                }
                Ok(())
            }
        }
    }

    /// Attach a local track to every established peer connection. Each
    /// transport answers with a negotiation-needed event, which drives
    /// the renegotiation exchange without tearing anything down.
    pub async fn add_track(&mut self, track_id: &str) -> Result<(), NegotiationError> {
        let remotes: Vec<PeerId> = self.peers.keys().copied().collect();
        for remote in remotes {
            self.dispatch(remote, PeerEvent::TrackAdded(track_id.to_string()))
                .await?;
        }
        Ok(())
    }

    /// Tear down every machine, e.g. when leaving the room.
    pub async fn close(&mut self) {
        for (_, negotiator) in self.peers.drain() {
            negotiator.close().await;
        }
    }

    async fn ensure_peer(&mut self, remote: PeerId) -> Result<(), NegotiationError> {
        if self.peers.contains_key(&remote) {
            return Ok(());
        }
        let transport = self.factory.create(remote).await?;
        let negotiator = PeerNegotiator::new(self.local_id, remote, transport, self.signals.clone());
        self.peers.insert(remote, negotiator);
        Ok(())
    }

    async fn dispatch(&mut self, remote: PeerId, event: PeerEvent) -> Result<(), NegotiationError> {
        match self.peers.get_mut(&remote) {
            Some(negotiator) => negotiator.handle(event).await,
            None => {
                debug!(remote = %remote, ?event, "dropping event for unknown peer");
                Ok(())
            }
        }
    }
}
