pub mod engine;
pub mod message;
pub mod quorum;
pub mod trust;

pub use engine::*;
pub use message::*;
pub use quorum::*;
pub use trust::*;
