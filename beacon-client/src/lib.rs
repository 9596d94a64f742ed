pub mod session;
pub mod transport;

pub use session::{
    NegotiationError, NegotiationState, PeerEvent, PeerNegotiator, RoomSession, SignalSink,
};
pub use transport::{PeerTransport, SdpKind, TransportError, TransportEvent, TransportFactory};

#[cfg(feature = "native")]
pub use transport::native::{NativePeerTransport, NativeTransportConfig, NativeTransportFactory};
