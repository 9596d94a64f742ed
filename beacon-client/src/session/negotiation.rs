use std::sync::Arc;

use beacon_core::{ClientMessage, IceCandidate, PeerId};
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::SignalSink;
use crate::transport::{PeerTransport, SdpKind, TransportError};

/// Where one pairwise negotiation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    HaveLocalOffer,
    HaveRemoteOffer,
    Connected,
    Renegotiating,
}

/// Inputs to the machine. Applied strictly in arrival order per peer;
/// cross-peer ordering is irrelevant since every remote peer has its
/// own machine.
#[derive(Debug)]
pub enum PeerEvent {
    /// Local intent to call: a peer is known to be present and this
    /// side initiates.
    CallRequested,
    RemoteOffer { sdp: String },
    RemoteAnswer { sdp: String },
    /// Renegotiation offer relayed from the remote peer.
    RemoteRenegotiationOffer { sdp: String },
    /// Renegotiation answer relayed from the remote peer.
    RemoteRenegotiationAnswer { sdp: String },
    RemoteCandidate(IceCandidate),
    /// A local candidate discovered by the transport.
    LocalCandidate(IceCandidate),
    /// The transport signalled that local media composition changed.
    NegotiationNeeded,
    /// The application attached a new local track.
    TrackAdded(String),
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Per-remote-peer negotiation machine.
///
/// Stale inputs (an answer with no outstanding offer, renegotiation
/// traffic in the wrong state) are logged and ignored rather than
/// failing the session: browsers legitimately deliver negotiation
/// traffic racily.
pub struct PeerNegotiator<T: PeerTransport> {
    local_id: PeerId,
    remote_id: PeerId,
    state: NegotiationState,
    transport: T,
    signals: Arc<dyn SignalSink>,
    /// Candidates that arrived before the remote description; flushed
    /// once it is applied.
    pending_candidates: Vec<IceCandidate>,
    have_remote_description: bool,
}

impl<T: PeerTransport> PeerNegotiator<T> {
    pub fn new(
        local_id: PeerId,
        remote_id: PeerId,
        transport: T,
        signals: Arc<dyn SignalSink>,
    ) -> Self {
        Self {
            local_id,
            remote_id,
            state: NegotiationState::Idle,
            transport,
            signals,
            pending_candidates: Vec::new(),
            have_remote_description: false,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn remote_id(&self) -> PeerId {
        self.remote_id
    }

    /// Glare tie-break: the peer with the greater identifier yields to
    /// the remote offer, the other keeps its own. Both sides compute
    /// this identically, so exactly one yields.
    fn polite(&self) -> bool {
        self.local_id > self.remote_id
    }

    pub async fn handle(&mut self, event: PeerEvent) -> Result<(), NegotiationError> {
        match event {
            PeerEvent::CallRequested => self.on_call_requested().await,
            PeerEvent::RemoteOffer { sdp } => self.on_remote_offer(sdp, false).await,
            PeerEvent::RemoteRenegotiationOffer { sdp } => self.on_remote_offer(sdp, true).await,
            PeerEvent::RemoteAnswer { sdp } => {
                self.on_remote_answer(sdp, NegotiationState::HaveLocalOffer)
                    .await
            }
            PeerEvent::RemoteRenegotiationAnswer { sdp } => {
                self.on_remote_answer(sdp, NegotiationState::Renegotiating)
                    .await
            }
            PeerEvent::RemoteCandidate(candidate) => self.on_remote_candidate(candidate).await,
            PeerEvent::LocalCandidate(candidate) => {
                self.signals
                    .send(ClientMessage::IceCandidate {
                        candidate,
                        target: Some(self.remote_id),
                    })
                    .await;
                Ok(())
            }
            PeerEvent::NegotiationNeeded => self.on_negotiation_needed().await,
            PeerEvent::TrackAdded(track_id) => self.on_track_added(&track_id).await,
        }
    }

    pub async fn close(self) {
        self.transport.close().await;
    }

    async fn on_call_requested(&mut self) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::Idle {
            warn!(remote = %self.remote_id, state = ?self.state, "call requested outside idle, ignoring");
            return Ok(());
        }

        let sdp = self.transport.create_offer().await?;
        self.transport
            .set_local_description(SdpKind::Offer, &sdp)
            .await?;
        self.signals
            .send(ClientMessage::Offer {
                sdp,
                target: Some(self.remote_id),
            })
            .await;
        self.state = NegotiationState::HaveLocalOffer;
        Ok(())
    }

    async fn on_remote_offer(
        &mut self,
        sdp: String,
        renegotiation: bool,
    ) -> Result<(), NegotiationError> {
        match self.state {
            NegotiationState::Idle | NegotiationState::Connected => {}
            NegotiationState::HaveLocalOffer | NegotiationState::Renegotiating
                if self.polite() =>
            {
                debug!(remote = %self.remote_id, "offer glare, yielding to remote offer");
            }
            NegotiationState::HaveLocalOffer | NegotiationState::Renegotiating => {
                warn!(remote = %self.remote_id, "offer glare, keeping local offer");
                return Ok(());
            }
            NegotiationState::HaveRemoteOffer => {
                warn!(remote = %self.remote_id, "duplicate remote offer, ignoring");
                return Ok(());
            }
        }

        self.state = NegotiationState::HaveRemoteOffer;
        self.transport
            .set_remote_description(SdpKind::Offer, &sdp)
            .await?;
        self.have_remote_description = true;
        self.flush_pending_candidates().await;

        let answer = self.transport.create_answer().await?;
        self.transport
            .set_local_description(SdpKind::Answer, &answer)
            .await?;

        let reply = if renegotiation {
            ClientMessage::NegoDone {
                sdp: answer,
                target: self.remote_id,
            }
        } else {
            ClientMessage::Answer {
                sdp: answer,
                target: self.remote_id,
            }
        };
        self.signals.send(reply).await;
        self.state = NegotiationState::Connected;
        Ok(())
    }

    async fn on_remote_answer(
        &mut self,
        sdp: String,
        expected: NegotiationState,
    ) -> Result<(), NegotiationError> {
        if self.state != expected {
            warn!(remote = %self.remote_id, state = ?self.state, "answer without outstanding offer, ignoring");
            return Ok(());
        }

        self.transport
            .set_remote_description(SdpKind::Answer, &sdp)
            .await?;
        self.have_remote_description = true;
        self.flush_pending_candidates().await;
        self.state = NegotiationState::Connected;
        Ok(())
    }

    async fn on_remote_candidate(&mut self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        if !self.have_remote_description {
            debug!(remote = %self.remote_id, "buffering candidate until remote description");
            self.pending_candidates.push(candidate);
            return Ok(());
        }

        if let Err(e) = self.transport.add_ice_candidate(&candidate).await {
            warn!(remote = %self.remote_id, "failed to add candidate: {e}");
        }
        Ok(())
    }

    async fn flush_pending_candidates(&mut self) {
        for candidate in self.pending_candidates.drain(..) {
            if let Err(e) = self.transport.add_ice_candidate(&candidate).await {
                warn!(remote = %self.remote_id, "failed to add buffered candidate: {e}");
            }
        }
    }

    async fn on_negotiation_needed(&mut self) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::Connected {
            debug!(remote = %self.remote_id, state = ?self.state, "negotiation-needed outside established connection, ignoring");
            return Ok(());
        }

        let sdp = self.transport.create_offer().await?;
        self.transport
            .set_local_description(SdpKind::Offer, &sdp)
            .await?;
        self.signals
            .send(ClientMessage::NegoNeeded {
                sdp,
                target: self.remote_id,
            })
            .await;
        self.state = NegotiationState::Renegotiating;
        Ok(())
    }

    async fn on_track_added(&mut self, track_id: &str) -> Result<(), NegotiationError> {
        // The transport reacts with a negotiation-needed event once the
        // track lands on an established connection.
        self.transport.add_track(track_id).await?;
        Ok(())
    }
}
