pub mod conformance;
mod error;
mod memory;
mod record;
mod traits;

pub use error::HostError;
pub use memory::{GraphState, MemoryGraph};
pub use record::{HostCollection, HostMode, HostValue, HostVariable, Rgba, ValueKind};
pub use traits::HostGraph;
