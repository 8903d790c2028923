pub mod common;
pub mod consensus;
pub mod error;
pub mod network;
pub mod sim;
