pub mod registry;
pub mod relay;
pub mod signaling;

pub use registry::{ConnectionRegistry, RegistryError, Removed};
pub use relay::{RoomRelay, SignalOutput};
pub use signaling::{SignalingService, SignalingState, dispatch, ws_handler};
