//! Capture source implementations

pub mod replay;

pub use replay::{Recording, ReplaySource};
