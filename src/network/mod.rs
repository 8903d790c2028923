pub mod node;
pub mod relay;

pub use node::*;
pub use relay::*;
