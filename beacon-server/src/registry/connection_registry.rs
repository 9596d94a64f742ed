use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use beacon_core::{PeerId, PeerInfo, RoomId, UserId};

use crate::registry::RegistryError;

#[derive(Debug, Default)]
struct ConnectionEntry {
    room: Option<RoomId>,
    user: Option<UserId>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    connections: HashMap<PeerId, ConnectionEntry>,
    /// Membership in join order. Join order decides who counts as
    /// "already present" when a new member arrives, which decides who
    /// initiates the offer.
    rooms: HashMap<RoomId, Vec<PeerId>>,
    users: HashMap<UserId, PeerId>,
}

/// Outcome of a successful [`ConnectionRegistry::remove`].
#[derive(Debug)]
pub struct Removed {
    pub room: Option<RoomId>,
    /// Members still in the room after the removal.
    pub remaining: Vec<PeerId>,
}

/// Process-wide connection/room/user bookkeeping. Pure state, no I/O.
///
/// All three maps sit behind one mutex: `assign_room` must snapshot the
/// pre-existing members and insert the joiner atomically, and `remove`
/// must update all maps in one step so a join racing a disconnect never
/// observes a half-updated room.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: Mutex<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a record for a freshly accepted connection, with no room.
    pub fn register(&self, peer_id: PeerId) -> Result<(), RegistryError> {
        let mut inner = self.lock();
        if inner.connections.contains_key(&peer_id) {
            return Err(RegistryError::DuplicateConnection(peer_id));
        }
        inner.connections.insert(peer_id, ConnectionEntry::default());
        Ok(())
    }

    /// Set or overwrite the connection's room, creating the room if
    /// absent, and return the members that were present before the join
    /// (in join order, joiner excluded). A connection belongs to at most
    /// one room: a re-join removes it from its previous room first.
    pub fn assign_room(
        &self,
        peer_id: PeerId,
        room: RoomId,
    ) -> Result<Vec<PeerInfo>, RegistryError> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let entry = inner
            .connections
            .get_mut(&peer_id)
            .ok_or(RegistryError::UnknownConnection(peer_id))?;
        if let Some(previous) = entry.room.replace(room.clone()) {
            Self::leave_room(&mut inner.rooms, &previous, peer_id);
        }

        let members = inner.rooms.entry(room).or_default();
        let existing = members.clone();
        members.push(peer_id);

        Ok(existing
            .into_iter()
            .map(|id| PeerInfo {
                peer_id: id,
                user: inner.connections.get(&id).and_then(|e| e.user.clone()),
            })
            .collect())
    }

    /// Bind an application-level identity to the connection. A label
    /// already bound elsewhere is rebound to this connection.
    pub fn bind_user(&self, peer_id: PeerId, user: UserId) -> Result<(), RegistryError> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let entry = inner
            .connections
            .get_mut(&peer_id)
            .ok_or(RegistryError::UnknownConnection(peer_id))?;
        if let Some(previous) = entry.user.replace(user.clone()) {
            inner.users.remove(&previous);
        }
        inner.users.insert(user, peer_id);
        Ok(())
    }

    pub fn lookup_room(&self, peer_id: &PeerId) -> Option<RoomId> {
        self.lock()
            .connections
            .get(peer_id)
            .and_then(|e| e.room.clone())
    }

    pub fn lookup_user(&self, user: &UserId) -> Option<PeerId> {
        self.lock().users.get(user).copied()
    }

    /// Membership snapshot in join order. Empty for an unknown room.
    pub fn members(&self, room: &RoomId) -> Vec<PeerId> {
        self.lock().rooms.get(room).cloned().unwrap_or_default()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.lock().connections.contains_key(peer_id)
    }

    pub fn peer_info(&self, peer_id: &PeerId) -> Option<PeerInfo> {
        self.lock().connections.get(peer_id).map(|e| PeerInfo {
            peer_id: *peer_id,
            user: e.user.clone(),
        })
    }

    /// Remove the connection from its room (pruning the room when it
    /// empties), unbind its user label, and delete the record.
    /// Idempotent: a second call for the same identifier returns `None`.
    /// Disconnects can race other cleanup, so this is never an error.
    pub fn remove(&self, peer_id: PeerId) -> Option<Removed> {
        let mut inner = self.lock();
        let entry = inner.connections.remove(&peer_id)?;

        if let Some(user) = entry.user {
            if inner.users.get(&user) == Some(&peer_id) {
                inner.users.remove(&user);
            }
        }

        let remaining = match &entry.room {
            Some(room) => {
                Self::leave_room(&mut inner.rooms, room, peer_id);
                inner.rooms.get(room).cloned().unwrap_or_default()
            }
            None => Vec::new(),
        };

        Some(Removed {
            room: entry.room,
            remaining,
        })
    }

    fn leave_room(rooms: &mut HashMap<RoomId, Vec<PeerId>>, room: &RoomId, peer_id: PeerId) {
        if let Some(members) = rooms.get_mut(room) {
            members.retain(|id| *id != peer_id);
            if members.is_empty() {
                rooms.remove(room);
            }
        }
    }
}
