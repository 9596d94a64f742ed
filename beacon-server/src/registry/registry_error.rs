use beacon_core::PeerId;
use thiserror::Error;

/// Registry failures are recoverable: callers log them and drop the
/// offending operation, never the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connection {0} is already registered")]
    DuplicateConnection(PeerId),

    #[error("connection {0} was never registered")]
    UnknownConnection(PeerId),
}
