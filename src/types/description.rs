//! Asset descriptions reported by the capture server

use serde::{Deserialize, Serialize};

/// One entry of the server's description list.
///
/// Only the fields needed for identity resolution are kept; everything else the
/// server reports (marker offsets, channel names, plate geometry) is dropped at
/// the source boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetDescription {
    RigidBody {
        id: i32,
        name: String,
        #[serde(default = "no_parent")]
        parent_id: i32,
    },
    Skeleton {
        id: i32,
        name: String,
        #[serde(default)]
        bones: Vec<String>,
    },
    /// Markersets carry no id but still occupy a slot in the data packet.
    MarkerSet {
        name: String,
        #[serde(default)]
        markers: Vec<String>,
    },
    ForcePlate {
        id: i32,
        serial: String,
    },
    Device {
        id: i32,
        name: String,
        #[serde(default)]
        serial: String,
    },
    /// Cameras never appear in frame data.
    Camera {
        name: String,
    },
    Asset {
        id: i32,
        name: String,
    },
    /// Descriptor type this crate does not understand.
    Unknown {
        type_code: i32,
    },
}

fn no_parent() -> i32 {
    -1
}

impl AssetDescription {
    /// Identity `(id, name)` for kinds that map into the directory.
    ///
    /// Force plates are named by their serial number.
    pub fn identity(&self) -> Option<(i32, &str)> {
        match self {
            AssetDescription::RigidBody { id, name, .. } => Some((*id, name)),
            AssetDescription::Skeleton { id, name, .. } => Some((*id, name)),
            AssetDescription::ForcePlate { id, serial } => Some((*id, serial)),
            AssetDescription::Device { id, name, .. } => Some((*id, name)),
            AssetDescription::Asset { id, name } => Some((*id, name)),
            AssetDescription::MarkerSet { .. }
            | AssetDescription::Camera { .. }
            | AssetDescription::Unknown { .. } => None,
        }
    }

    /// Short kind label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AssetDescription::RigidBody { .. } => "rigid_body",
            AssetDescription::Skeleton { .. } => "skeleton",
            AssetDescription::MarkerSet { .. } => "marker_set",
            AssetDescription::ForcePlate { .. } => "force_plate",
            AssetDescription::Device { .. } => "device",
            AssetDescription::Camera { .. } => "camera",
            AssetDescription::Asset { .. } => "asset",
            AssetDescription::Unknown { .. } => "unknown",
        }
    }

    pub fn rigid_body(id: i32, name: impl Into<String>) -> Self {
        AssetDescription::RigidBody { id, name: name.into(), parent_id: no_parent() }
    }

    pub fn marker_set(name: impl Into<String>) -> Self {
        AssetDescription::MarkerSet { name: name.into(), markers: Vec::new() }
    }
}
