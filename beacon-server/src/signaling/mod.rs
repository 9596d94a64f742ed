mod signaling_service;
mod ws_handler;

pub use signaling_service::{SignalingService, SignalingState};
pub use ws_handler::{dispatch, ws_handler};
