pub mod controller;
pub mod injector;
pub mod topology;

pub use controller::*;
pub use injector::*;
pub use topology::*;
