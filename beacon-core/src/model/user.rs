use serde::{Deserialize, Serialize};
use std::fmt;

/// Optional application-level identity a client may announce on join,
/// e.g. an email-like label. Distinct from [`crate::PeerId`], which is
/// transport-scoped and minted by the coordinator.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
