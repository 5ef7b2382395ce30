//! Connection layer: owns the driver task and exposes snapshot streams

pub mod live;

#[cfg(test)]
mod tests;

pub use live::LiveConnection;
