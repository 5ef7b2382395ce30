//! Latest-pose hand-off and republishing for motion-capture rigid bodies.
//!
//! Posecast sits between a motion-capture client, whose callback thread
//! delivers frames at capture rate, and a consumer that polls at its own pace.
//!
//! # Features
//!
//! - **Bounded hand-off**: a timed-lock mailbox that never blocks the capture
//!   thread for long and keeps only the newest frames
//! - **Poses by name**: asset descriptions resolve numeric ids to names
//! - **Republishing**: tracked bodies go out as fixed 36-byte records over UDP
//! - **Streaming**: an async driver publishes snapshots on a watch channel
//! - **Replay**: YAML recordings play back as a capture source
//!
//! ## Example (replay)
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use posecast::{BridgeConfig, Posecast, UpdateRate};
//!
//! #[tokio::main]
//! async fn main() -> posecast::Result<()> {
//!     let connection = Posecast::replay("session.yaml", &BridgeConfig::default()).await?;
//!     let mut poses = connection.rigid_body_updates("Stick", UpdateRate::Max(30));
//!
//!     while let Some(pose) = poses.next().await {
//!         println!("Stick at {:?}", pose.position());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod logging;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Consumer-side state
pub mod directory;
pub mod mailbox;
pub mod snapshot;
pub mod tracker;

// Capture sources
pub mod source;
pub mod sources;

// Republishing
pub mod bridge;

// Stream-based architecture
pub mod connection;
pub mod driver;
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;

pub use config::BridgeConfig;
pub use directory::AssetDirectory;
pub use mailbox::{EnqueueOutcome, FrameMailbox, FrameSink, MailboxStats};
pub use snapshot::{PoseSnapshot, UnresolvedPolicy};
pub use source::{CaptureSource, ConnectParams};
pub use tracker::PoseTracker;

// Main API exports
pub use bridge::{PublishBridge, Transport, WireRecord};
pub use connection::LiveConnection;
pub use sources::{Recording, ReplaySource};

/// Unified entry point for pose streaming connections.
///
/// # Examples
///
/// ```rust,no_run
/// use posecast::{BridgeConfig, Posecast};
///
/// #[tokio::main]
/// async fn main() -> posecast::Result<()> {
///     let config = BridgeConfig::load("posecast.yaml")?;
///     let connection = Posecast::replay("session.yaml", &config).await?;
///     println!("{:?}", connection.rigid_body("Stick"));
///     Ok(())
/// }
/// ```
pub struct Posecast;

impl Posecast {
    /// Connect a capture source and start streaming.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The source cannot reach the server
    /// - The description request fails
    /// - The publish endpoint cannot be set up
    pub async fn connect<S: CaptureSource>(source: S, config: &BridgeConfig) -> Result<LiveConnection> {
        LiveConnection::connect(source, config).await
    }

    /// Play a YAML recording as if it were a live server.
    ///
    /// # Errors
    ///
    /// Returns an error if the recording cannot be read or parsed, or for any
    /// reason [`Posecast::connect`] would.
    pub async fn replay<P: AsRef<std::path::Path>>(path: P, config: &BridgeConfig) -> Result<LiveConnection> {
        let source = ReplaySource::open(path)?;
        LiveConnection::connect(source, config).await
    }
}
