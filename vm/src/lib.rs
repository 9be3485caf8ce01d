pub mod bridge;
pub mod dump;
pub mod error;
pub mod model;

pub use bridge::Bridge;
pub use error::VmError;
pub use model::State;
