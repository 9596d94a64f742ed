mod negotiation;
mod room_session;
mod signal_sink;
#[cfg(test)]
pub(crate) mod test_support;

pub use negotiation::{NegotiationError, NegotiationState, PeerEvent, PeerNegotiator};
pub use room_session::RoomSession;
pub use signal_sink::SignalSink;
