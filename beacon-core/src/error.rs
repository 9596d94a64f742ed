use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("room identifier must be non-empty")]
    EmptyRoomId,

    #[error("malformed peer identifier: {0}")]
    MalformedPeerId(#[from] uuid::Error),
}
