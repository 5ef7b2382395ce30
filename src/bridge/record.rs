//! Fixed-layout rigid body wire record

use crate::types::RigidBodyRecord;
use crate::{PosecastError, Result};

/// Encoded size of a [`WireRecord`].
pub const WIRE_RECORD_SIZE: usize = 36;

/// One published rigid body.
///
/// Nine 4-byte fields in declaration order, native byte order, no padding.
/// Orientation is sent w-first.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WireRecord {
    pub id: i32,
    pub mean_error: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub qw: f32,
    pub qx: f32,
    pub qy: f32,
    pub qz: f32,
}

const _: () = assert!(std::mem::size_of::<WireRecord>() == WIRE_RECORD_SIZE);

impl WireRecord {
    pub fn to_bytes(&self) -> [u8; WIRE_RECORD_SIZE] {
        let fields = [
            self.mean_error,
            self.x,
            self.y,
            self.z,
            self.qw,
            self.qx,
            self.qy,
            self.qz,
        ];

        let mut bytes = [0u8; WIRE_RECORD_SIZE];
        bytes[..4].copy_from_slice(&self.id.to_ne_bytes());
        for (chunk, value) in bytes[4..].chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_ne_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != WIRE_RECORD_SIZE {
            return Err(PosecastError::encoding(format!(
                "rigid body record must be {} bytes, got {}",
                WIRE_RECORD_SIZE,
                bytes.len()
            )));
        }

        let word = |index: usize| -> [u8; 4] {
            let start = index * 4;
            [bytes[start], bytes[start + 1], bytes[start + 2], bytes[start + 3]]
        };
        let float = |index: usize| f32::from_ne_bytes(word(index));

        Ok(Self {
            id: i32::from_ne_bytes(word(0)),
            mean_error: float(1),
            x: float(2),
            y: float(3),
            z: float(4),
            qw: float(5),
            qx: float(6),
            qy: float(7),
            qz: float(8),
        })
    }
}

impl From<&RigidBodyRecord> for WireRecord {
    fn from(body: &RigidBodyRecord) -> Self {
        let [x, y, z] = body.position;
        let [qx, qy, qz, qw] = body.orientation;
        Self { id: body.id, mean_error: body.mean_error, x, y, z, qw, qx, qy, qz }
    }
}
