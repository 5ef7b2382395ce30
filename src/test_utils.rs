//! Test utilities: fixture builders and a hand-driven capture source
//!
//! Shared by unit tests, integration tests and benchmarks.

#![cfg(any(test, feature = "benchmark"))]

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::directory::AssetDirectory;
use crate::mailbox::{EnqueueOutcome, FrameSink};
use crate::source::{CaptureSource, ConnectParams};
use crate::sources::Recording;
use crate::types::{AssetDescription, RawFrame, RigidBodyRecord, ServerInfo, Version};
use crate::{PosecastError, Result};

/// Frame holding one tracked body at `position` with identity orientation.
pub fn frame_with_body(frame_number: u32, id: i32, position: [f32; 3]) -> RawFrame {
    RawFrame::new(frame_number, vec![RigidBodyRecord::new(id, position, [0.0, 0.0, 0.0, 1.0])])
}

/// A markerset followed by rigid body 7 named "Stick".
pub fn stick_descriptions() -> Vec<AssetDescription> {
    vec![AssetDescription::marker_set("Stick"), AssetDescription::rigid_body(7, "Stick")]
}

pub fn stick_directory() -> AssetDirectory {
    AssetDirectory::from_descriptions(&stick_descriptions())
}

/// Server diagnostics resembling a real capture host.
pub fn sample_server_info() -> ServerInfo {
    ServerInfo {
        host_app: "Motive".to_string(),
        host_app_version: Version([3, 1, 0, 0]),
        protocol_version: Version([4, 1, 0, 0]),
        host_computer: "capture-host".to_string(),
        frame_rate: Some(120.0),
        analog_samples_per_frame: Some(0),
    }
}

/// Recording of body 7 moving along x, one unit per frame.
pub fn stick_recording(frames: u32) -> Recording {
    Recording {
        server: sample_server_info(),
        descriptions: stick_descriptions(),
        frames: (0..frames).map(|n| frame_with_body(n, 7, [n as f32, 0.0, 0.0])).collect(),
    }
}

/// Frame with `bodies` rigid bodies, ids `0..bodies`, every other one untracked.
pub fn crowded_frame(frame_number: u32, bodies: i32) -> RawFrame {
    RawFrame::new(
        frame_number,
        (0..bodies)
            .map(|id| {
                RigidBodyRecord::new(id, [id as f32, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0])
                    .with_tracking(id % 2 == 0)
            })
            .collect(),
    )
}

#[derive(Debug, Default)]
struct ManualState {
    descriptions: Vec<AssetDescription>,
    sink: Option<FrameSink>,
    connected: bool,
    refuse: bool,
    description_delay: Duration,
}

/// Capture source driven by the test itself.
///
/// Clones share state, so a test can keep one handle to push frames while the
/// tracker owns the other.
#[derive(Debug, Clone, Default)]
pub struct ManualSource {
    state: Arc<Mutex<ManualState>>,
}

impl ManualSource {
    pub fn new(descriptions: Vec<AssetDescription>) -> Self {
        let state = ManualState { descriptions, ..ManualState::default() };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// Deliver a frame as the capture callback would.
    ///
    /// Returns `None` when no sink is attached.
    pub fn push(&self, frame: RawFrame) -> Option<EnqueueOutcome> {
        let sink = self.state.lock().sink.clone()?;
        Some(sink.deliver(frame))
    }

    pub fn set_descriptions(&self, descriptions: Vec<AssetDescription>) {
        self.state.lock().descriptions = descriptions;
    }

    /// Make description queries block for `delay`, like a slow server.
    pub fn set_description_delay(&self, delay: Duration) {
        self.state.lock().description_delay = delay;
    }

    /// Make every following server call fail.
    pub fn refuse_connections(&self) {
        self.state.lock().refuse = true;
    }
}

impl CaptureSource for ManualSource {
    fn connect(&mut self, params: &ConnectParams) -> Result<ServerInfo> {
        let mut state = self.state.lock();
        if state.refuse {
            return Err(PosecastError::connection_failed(format!(
                "{} refused the connection",
                params.server_address
            )));
        }
        state.connected = true;
        Ok(sample_server_info())
    }

    fn disconnect(&mut self) {
        self.state.lock().connected = false;
    }

    fn test_connection(&mut self) -> Result<()> {
        let state = self.state.lock();
        if state.connected && !state.refuse {
            Ok(())
        } else {
            Err(PosecastError::connection_failed("test request unanswered"))
        }
    }

    fn data_descriptions(&mut self) -> Result<Vec<AssetDescription>> {
        let delay = self.state.lock().description_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let state = self.state.lock();
        if state.refuse {
            return Err(PosecastError::connection_failed("description request unanswered"));
        }
        if !state.connected {
            return Err(PosecastError::not_connected("data_descriptions"));
        }
        Ok(state.descriptions.clone())
    }

    fn attach(&mut self, sink: FrameSink) {
        self.state.lock().sink = Some(sink);
    }
}
