mod room_relay;
mod signal_output;

pub use room_relay::RoomRelay;
pub use signal_output::SignalOutput;
