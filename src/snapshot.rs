//! Last-known pose per named rigid body.
//!
//! A snapshot is rebuilt from each non-empty drained batch: cleared, then filled
//! from every frame in arrival order so later frames overwrite earlier ones.
//! The per-body tracking flag does not gate insertion here; a snapshot holds
//! the latest reported pose even if the body was lost in that frame. Callers
//! that care can inspect [`RawFrame::tracked_bodies`] themselves. The publish
//! path applies the flag instead (see [`crate::bridge`]).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::directory::{AssetDirectory, UNRESOLVED_NAME};
use crate::types::{Pose, RawFrame};

/// What to do with a body whose id is not in the directory yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Key it under the placeholder name (all unresolved bodies share one entry)
    #[default]
    Placeholder,
    /// Leave it out of the snapshot
    Drop,
}

/// Map from resolved body name to its latest pose.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoseSnapshot {
    poses: HashMap<String, Pose>,
    /// Frame number of the newest frame folded in
    frame_number: Option<u32>,
}

impl PoseSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace contents with the poses in `frames`.
    ///
    /// An empty batch leaves the snapshot untouched so the previous poses stay
    /// readable between producer updates. Returns the number of body records
    /// that were applied.
    pub fn rebuild(
        &mut self,
        frames: &[RawFrame],
        directory: &AssetDirectory,
        policy: UnresolvedPolicy,
    ) -> usize {
        if frames.is_empty() {
            return 0;
        }

        self.poses.clear();

        let mut applied = 0;
        for frame in frames {
            for body in &frame.rigid_bodies {
                let name = match directory.name_of(body.id) {
                    Some(name) => name,
                    None => {
                        debug!(id = body.id, frame = frame.frame_number, "Unresolved rigid body id");
                        match policy {
                            UnresolvedPolicy::Placeholder => UNRESOLVED_NAME,
                            UnresolvedPolicy::Drop => continue,
                        }
                    }
                };
                self.poses.insert(name.to_string(), body.pose());
                applied += 1;
            }
            self.frame_number = Some(frame.frame_number);
        }

        applied
    }

    /// Latest pose of `name`.
    pub fn get(&self, name: &str) -> Option<Pose> {
        self.poses.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.poses.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Pose)> {
        self.poses.iter().map(|(name, pose)| (name.as_str(), pose))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.poses.keys().map(String::as_str)
    }

    pub fn frame_number(&self) -> Option<u32> {
        self.frame_number
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}
