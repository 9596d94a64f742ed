mod connection_registry;
mod registry_error;

pub use connection_registry::{ConnectionRegistry, Removed};
pub use registry_error::RegistryError;
