use std::sync::Arc;

use async_trait::async_trait;
use beacon_core::{IceCandidate, PeerId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpKind {
    Offer,
    Answer,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport setup failed: {0}")]
    Setup(String),

    #[error("description error: {0}")]
    Description(String),

    #[error("candidate rejected: {0}")]
    Candidate(String),

    #[error("track error: {0}")]
    Track(String),
}

/// Events a transport implementation feeds back to its owner, to be
/// forwarded into the negotiation machine for the same remote peer.
#[derive(Debug)]
pub enum TransportEvent {
    /// A local ICE candidate was discovered (trickle ICE).
    LocalCandidate(IceCandidate),
    /// Local media composition changed in a way that requires a new
    /// offer/answer exchange.
    NegotiationNeeded,
    /// The underlying connection failed or closed.
    Disconnected,
}

/// Port over one underlying peer connection. The negotiation machine
/// drives exclusively through this trait and never sees the native
/// connection object.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<String, TransportError>;

    async fn create_answer(&self) -> Result<String, TransportError>;

    async fn set_local_description(&self, kind: SdpKind, sdp: &str) -> Result<(), TransportError>;

    /// Implementations must accept a remote offer while a local offer
    /// is still pending (implicit rollback of the local one); the
    /// machine relies on this when yielding under glare.
    async fn set_remote_description(&self, kind: SdpKind, sdp: &str) -> Result<(), TransportError>;

    async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<(), TransportError>;

    /// Attach a local media track. On an established connection the
    /// implementation reacts with [`TransportEvent::NegotiationNeeded`].
    async fn add_track(&self, track_id: &str) -> Result<(), TransportError>;

    async fn close(&self);
}

/// Creates one transport per remote peer on behalf of a room session.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    type Transport: PeerTransport;

    async fn create(&self, remote: PeerId) -> Result<Self::Transport, TransportError>;
}

#[async_trait]
impl<F> TransportFactory for Arc<F>
where
    F: TransportFactory + ?Sized,
{
    type Transport = F::Transport;

    async fn create(&self, remote: PeerId) -> Result<Self::Transport, TransportError> {
        (**self).create(remote).await
    }
}
