
use std::sync::Arc;
use tracing::Level;

use beacon_server::{ConnectionRegistry, RoomRelay};

use crate::utils::MockSignalOutput;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_relay() -> (Arc<ConnectionRegistry>, MockSignalOutput, RoomRelay) {
    let registry = Arc::new(ConnectionRegistry::new());
    let output = MockSignalOutput::new();
    let relay = RoomRelay::new(registry.clone(), Arc::new(output.clone()));
    (registry, output, relay)
}
