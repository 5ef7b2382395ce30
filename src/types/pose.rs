//! Pose vector type

use serde::{Deserialize, Serialize};

/// Seven-component rigid body pose `[x, y, z, qx, qy, qz, qw]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose(pub [f64; 7]);

impl Pose {
    /// Origin with identity orientation.
    pub const IDENTITY: Pose = Pose([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

    pub fn position(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Quaternion in (qx, qy, qz, qw) order.
    pub fn orientation(&self) -> [f64; 4] {
        [self.0[3], self.0[4], self.0[5], self.0[6]]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<[f64; 7]> for Pose {
    fn from(values: [f64; 7]) -> Self {
        Pose(values)
    }
}

impl From<Pose> for [f64; 7] {
    fn from(pose: Pose) -> Self {
        pose.0
    }
}
