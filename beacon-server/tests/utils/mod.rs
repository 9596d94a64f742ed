pub mod mock_output;

pub use memory_link::*;
pub use mock_output::*;
pub use mock_transport::*;
