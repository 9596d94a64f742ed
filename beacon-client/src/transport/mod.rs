#[cfg(feature = "native")]
pub mod native;
mod peer_transport;

pub use peer_transport::{PeerTransport, SdpKind, TransportError, TransportEvent, TransportFactory};
