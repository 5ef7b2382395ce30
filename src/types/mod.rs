//! Core types for pose ingestion.
//!
//! ## Architecture
//!
//! - [`RawFrame`] is an owned copy of one capture update: rigid body records plus
//!   host-clock timestamps
//! - [`RigidBodyRecord`] is a single body in a frame, with its tracking flag
//! - [`AssetDescription`] is one entry of the server's description list, used to
//!   resolve streaming ids into names
//! - [`Pose`] is the 7-component `[x, y, z, qx, qy, qz, qw]` vector kept per body
//! - [`ServerInfo`] holds the diagnostics reported on connect
//!
//! ## Usage Example
//!
//! ```rust
//! use posecast::types::{RawFrame, RigidBodyRecord};
//!
//! let frame = RawFrame::new(
//!     42,
//!     vec![
//!         RigidBodyRecord::new(7, [1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]),
//!         RigidBodyRecord::new(8, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]).with_tracking(false),
//!     ],
//! );
//!
//! assert_eq!(frame.tracked_bodies().count(), 1);
//! assert_eq!(frame.rigid_bodies[0].pose().0, [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0]);
//! ```

mod description;
mod frame;
mod pose;
mod server;
mod update_rate;

pub use description::AssetDescription;
pub use frame::{FrameTimestamps, RawFrame, RigidBodyRecord, TRACKING_VALID};
pub use pose::Pose;
pub use server::{ServerInfo, Version};
pub use update_rate::UpdateRate;
