//! Frame types handed from the capture thread to the consumer

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Pose;

/// Bit 0 of [`RigidBodyRecord::params`]: body was successfully tracked this frame.
pub const TRACKING_VALID: u16 = 0x01;

/// One rigid body as reported in a single capture update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyRecord {
    /// Streaming id, resolved to a name through the asset directory
    pub id: i32,
    /// Position (x, y, z)
    pub position: [f32; 3],
    /// Orientation quaternion (qx, qy, qz, qw)
    pub orientation: [f32; 4],
    /// Mean marker error
    #[serde(default)]
    pub mean_error: f32,
    /// Per-body flags as sent by the server
    #[serde(default)]
    pub params: u16,
}

impl RigidBodyRecord {
    pub fn new(id: i32, position: [f32; 3], orientation: [f32; 4]) -> Self {
        Self { id, position, orientation, mean_error: 0.0, params: TRACKING_VALID }
    }

    /// Builder-style override of the tracking flag.
    pub fn with_tracking(mut self, tracked: bool) -> Self {
        if tracked {
            self.params |= TRACKING_VALID;
        } else {
            self.params &= !TRACKING_VALID;
        }
        self
    }

    pub fn with_mean_error(mut self, mean_error: f32) -> Self {
        self.mean_error = mean_error;
        self
    }

    /// Whether the server tracked this body in this frame.
    pub fn tracking_valid(&self) -> bool {
        self.params & TRACKING_VALID != 0
    }

    /// Widened 7-component pose `[x, y, z, qx, qy, qz, qw]`.
    pub fn pose(&self) -> Pose {
        let [x, y, z] = self.position;
        let [qx, qy, qz, qw] = self.orientation;
        Pose([x, y, z, qx, qy, qz, qw].map(f64::from))
    }
}

/// Host-clock instants attached to a frame.
///
/// All three are measured on the capture host's clock so the differences are
/// meaningful even though the consumer runs on another machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTimestamps {
    /// Middle of the camera exposure that produced the frame
    pub camera_mid_exposure: Duration,
    /// When the server sent the frame
    pub transmit: Duration,
    /// When the client callback copied the frame
    pub received: Duration,
}

impl FrameTimestamps {
    /// Exposure-to-client latency.
    pub fn client_latency(&self) -> Duration {
        self.received.saturating_sub(self.camera_mid_exposure)
    }

    /// Transmit-to-client latency.
    pub fn transit_latency(&self) -> Duration {
        self.received.saturating_sub(self.transmit)
    }
}

/// Owned copy of one capture update.
///
/// Sources copy out of whatever buffer the capture client hands them, so a
/// `RawFrame` lives independently of the client's internal storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    /// Server frame counter
    pub frame_number: u32,
    /// Rigid bodies in server order
    #[serde(default)]
    pub rigid_bodies: Vec<RigidBodyRecord>,
    #[serde(default)]
    pub timestamps: FrameTimestamps,
}

impl RawFrame {
    pub fn new(frame_number: u32, rigid_bodies: Vec<RigidBodyRecord>) -> Self {
        Self { frame_number, rigid_bodies, timestamps: FrameTimestamps::default() }
    }

    pub fn with_timestamps(mut self, timestamps: FrameTimestamps) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Bodies the server flagged as tracked in this frame.
    pub fn tracked_bodies(&self) -> impl Iterator<Item = &RigidBodyRecord> {
        self.rigid_bodies.iter().filter(|body| body.tracking_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_flag_round_trips_through_builder() {
        let body = RigidBodyRecord::new(7, [1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]);
        assert!(body.tracking_valid());

        let lost = body.with_tracking(false);
        assert!(!lost.tracking_valid());
        assert!(lost.with_tracking(true).tracking_valid());
    }

    #[test]
    fn other_param_bits_do_not_count_as_tracked() {
        let mut body = RigidBodyRecord::new(3, [0.0; 3], [0.0, 0.0, 0.0, 1.0]);
        body.params = 0x02;
        assert!(!body.tracking_valid());
    }

    #[test]
    fn pose_uses_xyz_then_quaternion_xyzw() {
        let body = RigidBodyRecord::new(7, [1.0, 2.0, 3.0], [0.1, 0.2, 0.3, 0.9]);
        let pose = body.pose();
        assert_eq!(pose.position(), [1.0, 2.0, 3.0]);
        assert_eq!(pose.0[6], f64::from(0.9f32));
        assert_eq!(pose.0[3], f64::from(0.1f32));
    }

    #[test]
    fn latencies_saturate_on_clock_skew() {
        let stamps = FrameTimestamps {
            camera_mid_exposure: Duration::from_millis(100),
            transmit: Duration::from_millis(104),
            received: Duration::from_millis(107),
        };
        assert_eq!(stamps.client_latency(), Duration::from_millis(7));
        assert_eq!(stamps.transit_latency(), Duration::from_millis(3));

        let skewed = FrameTimestamps { received: Duration::from_millis(50), ..stamps };
        assert_eq!(skewed.client_latency(), Duration::ZERO);
    }

    #[test]
    fn tracked_bodies_filters_untracked() {
        let frame = RawFrame::new(
            1,
            vec![
                RigidBodyRecord::new(1, [0.0; 3], [0.0, 0.0, 0.0, 1.0]),
                RigidBodyRecord::new(2, [0.0; 3], [0.0, 0.0, 0.0, 1.0]).with_tracking(false),
            ],
        );
        let ids: Vec<i32> = frame.tracked_bodies().map(|b| b.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
