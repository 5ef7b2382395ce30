//! Capture server diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Four-part version number as reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub [u8; 4]);

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

/// What the server said about itself on connect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    pub host_app: String,
    pub host_app_version: Version,
    pub protocol_version: Version,
    pub host_computer: String,
    /// Mocap frame rate, if the server answered the query
    pub frame_rate: Option<f32>,
    /// Analog samples per mocap frame, if the server answered the query
    pub analog_samples_per_frame: Option<i32>,
}
