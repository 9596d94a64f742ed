use std::sync::Arc;

use beacon_core::{PeerId, RoomId, ServerMessage, UserId};
use tracing::{debug, info, warn};

use crate::registry::ConnectionRegistry;
use crate::relay::SignalOutput;

/// Routes negotiation messages between room members. Deliberately
/// stateless with respect to negotiation semantics: it never parses an
/// SDP payload and adds no retry, dedup, or ordering of its own.
#[derive(Clone)]
pub struct RoomRelay {
    registry: Arc<ConnectionRegistry>,
    output: Arc<dyn SignalOutput>,
}

impl RoomRelay {
    pub fn new(registry: Arc<ConnectionRegistry>, output: Arc<dyn SignalOutput>) -> Self {
        Self { registry, output }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Put the connection into `room` and announce it.
    ///
    /// Ordering is load-bearing: the membership snapshot is taken at
    /// assignment, the joiner gets `room-joined` listing exactly the
    /// members that preceded it, and only those members get
    /// `peer-joined`. The joiner never sees its own join.
    pub async fn join(&self, peer_id: PeerId, room: RoomId, user: Option<UserId>) {
        if room.is_empty() {
            warn!(%peer_id, "rejecting join with empty room id");
            return;
        }

        if let Some(user) = user.clone() {
            if let Err(e) = self.registry.bind_user(peer_id, user) {
                warn!(%peer_id, "cannot bind user label: {e}");
                return;
            }
        }

        let existing = match self.registry.assign_room(peer_id, room.clone()) {
            Ok(existing) => existing,
            Err(e) => {
                warn!(%peer_id, room = %room, "join rejected: {e}");
                return;
            }
        };

        info!(%peer_id, room = %room, members = existing.len() + 1, "peer joined room");

        self.output
            .deliver(
                peer_id,
                ServerMessage::RoomJoined {
                    room,
                    peers: existing.clone(),
                },
            )
            .await;

        let announcement = ServerMessage::PeerJoined { peer_id, user };
        for member in existing {
            self.output
                .deliver(member.peer_id, announcement.clone())
                .await;
        }
    }

    /// Deliver to every member of `room` except the sender. A room with
    /// no other members is a no-op, not an error.
    pub async fn broadcast(&self, sender: PeerId, room: &RoomId, msg: ServerMessage) {
        for member in self.registry.members(room) {
            if member != sender {
                self.output.deliver(member, msg.clone()).await;
            }
        }
    }

    /// Deliver directly to `target`, regardless of room. A target that
    /// has disconnected is dropped silently: the sender will learn of
    /// the disconnect through its own `peer-left` notification.
    pub async fn unicast(&self, sender: PeerId, target: PeerId, msg: ServerMessage) {
        if !self.registry.contains(&target) {
            debug!(%sender, %target, "dropping signal for vanished peer");
            return;
        }
        self.output.deliver(target, msg).await;
    }

    /// Unified dispatch: an explicit target means unicast, otherwise
    /// the message goes to the sender's current room.
    pub async fn relay(&self, sender: PeerId, target: Option<PeerId>, msg: ServerMessage) {
        match target {
            Some(target) => self.unicast(sender, target, msg).await,
            None => match self.registry.lookup_room(&sender) {
                Some(room) => self.broadcast(sender, &room, msg).await,
                None => warn!(%sender, "dropping signal from a connection outside any room"),
            },
        }
    }

    /// Registry cleanup plus `peer-left` to whoever shared the room.
    /// Safe to call more than once per connection.
    pub async fn disconnect(&self, peer_id: PeerId) {
        let Some(removed) = self.registry.remove(peer_id) else {
            return;
        };

        if let Some(room) = removed.room {
            info!(%peer_id, %room, "peer left room");
            let note = ServerMessage::PeerLeft { peer_id };
            for member in removed.remaining {
                self.output.deliver(member, note.clone()).await;
            }
        }
    }
}
