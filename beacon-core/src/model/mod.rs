mod ice;
mod peer;
mod room;
mod signaling;
mod user;

pub use ice::{IceCandidate, IceServerConfig};
pub use peer::PeerId;
pub use room::RoomId;
pub use signaling::{ClientMessage, PeerInfo, ServerMessage};
pub use user::UserId;
