use serde::{Deserialize, Serialize};

use crate::model::ice::{IceCandidate, IceServerConfig};
use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use crate::model::user::UserId;

/// Messages a client sends to the coordinator.
///
/// The negotiation ops carry an optional `target`: when present the
/// coordinator unicasts to that connection, otherwise it broadcasts to
/// the sender's current room. SDP and candidate payloads are never
/// parsed server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ClientMessage {
    Join {
        room: RoomId,
        user: Option<UserId>,
    },
    Offer {
        sdp: String,
        target: Option<PeerId>,
    },
    Answer {
        sdp: String,
        target: PeerId,
    },
    IceCandidate {
        candidate: IceCandidate,
        target: Option<PeerId>,
    },
    /// Renegotiation offer, sent after local media composition changed
    /// on an already-established connection.
    NegoNeeded {
        sdp: String,
        target: PeerId,
    },
    /// Renegotiation answer.
    NegoDone {
        sdp: String,
        target: PeerId,
    },
}

/// Messages the coordinator sends to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// First message on every connection: the minted connection id plus
    /// the ICE server configuration clients should dial with.
    Welcome {
        peer_id: PeerId,
        ice_servers: Vec<IceServerConfig>,
    },
    /// Reply to `join`: the members that were already present, in join
    /// order. The joiner does not appear in the list.
    RoomJoined {
        room: RoomId,
        peers: Vec<PeerInfo>,
    },
    /// Broadcast to pre-existing members when someone joins their room.
    PeerJoined {
        peer_id: PeerId,
        user: Option<UserId>,
    },
    /// Broadcast to remaining members when a connection goes away.
    PeerLeft {
        peer_id: PeerId,
    },
    Offer {
        from: PeerId,
        sdp: String,
    },
    Answer {
        from: PeerId,
        sdp: String,
    },
    IceCandidate {
        from: PeerId,
        candidate: IceCandidate,
    },
    NegoNeeded {
        from: PeerId,
        sdp: String,
    },
    NegoDone {
        from: PeerId,
        sdp: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeerInfo {
    pub peer_id: PeerId,
    pub user: Option<UserId>,
}
