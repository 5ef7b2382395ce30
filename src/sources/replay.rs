//! Replay source for recorded capture sessions

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::mailbox::{EnqueueOutcome, FrameSink};
use crate::source::{CaptureSource, ConnectParams};
use crate::types::{AssetDescription, FrameTimestamps, RawFrame, ServerInfo};
use crate::{PosecastError, Result};

/// Playback rate used when a recording does not state one.
pub const DEFAULT_REPLAY_HZ: f64 = 120.0;

/// A recorded session: what the server reported plus the frames it sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recording {
    pub server: ServerInfo,
    pub descriptions: Vec<AssetDescription>,
    pub frames: Vec<RawFrame>,
}

impl Recording {
    pub fn new(descriptions: Vec<AssetDescription>, frames: Vec<RawFrame>) -> Self {
        Self { server: ServerInfo::default(), descriptions, frames }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| PosecastError::Parse {
            context: "Recording".to_string(),
            details: e.to_string(),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| PosecastError::file_error(path.to_path_buf(), e))?;
        let recording = Self::from_yaml_str(&yaml)?;
        info!(
            "Opened recording {}: {} descriptions, {} frames",
            path.display(),
            recording.descriptions.len(),
            recording.frames.len()
        );
        Ok(recording)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

/// Capture source that plays a [`Recording`] from its own producer thread.
pub struct ReplaySource {
    recording: Arc<Recording>,
    rate_hz: f64,
    looping: bool,
    sink: Option<FrameSink>,
    connected: bool,
    cancel: Option<CancellationToken>,
    worker: Option<JoinHandle<()>>,
    clock: Instant,
}

impl ReplaySource {
    pub fn new(recording: Recording) -> Self {
        let rate_hz = recording
            .server
            .frame_rate
            .filter(|hz| hz.is_finite() && *hz > 0.0)
            .map(f64::from)
            .unwrap_or(DEFAULT_REPLAY_HZ);

        Self {
            recording: Arc::new(recording),
            rate_hz,
            looping: false,
            sink: None,
            connected: false,
            cancel: None,
            worker: None,
            clock: Instant::now(),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Recording::load(path)?))
    }

    /// Override the playback rate, clamped to 1..=10000 Hz. A non-finite
    /// rate is ignored.
    pub fn with_rate(mut self, hz: f64) -> Self {
        if hz.is_finite() {
            self.rate_hz = hz.clamp(1.0, 10_000.0);
        } else {
            warn!(hz, "Ignoring non-finite replay rate, keeping {}Hz", self.rate_hz);
        }
        self
    }

    /// Restart from the first frame after the last one.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    /// Whether the producer thread is still delivering frames.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    fn start_worker(&mut self) {
        self.stop_worker();

        let Some(sink) = self.sink.clone() else {
            debug!("No frame sink attached, replay not started");
            return;
        };

        let cancel = CancellationToken::new();
        let recording = Arc::clone(&self.recording);
        let interval = Duration::from_secs_f64(1.0 / self.rate_hz);
        let looping = self.looping;
        let clock = self.clock;
        let token = cancel.clone();

        let worker = std::thread::Builder::new()
            .name("posecast-replay".to_string())
            .spawn(move || play(&recording, sink, interval, looping, clock, &token));

        match worker {
            Ok(handle) => {
                self.cancel = Some(cancel);
                self.worker = Some(handle);
            }
            Err(e) => warn!("Failed to spawn replay thread: {}", e),
        }
    }

    fn stop_worker(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Replay thread panicked");
            }
        }
    }
}

fn play(
    recording: &Recording,
    sink: FrameSink,
    interval: Duration,
    looping: bool,
    clock: Instant,
    cancel: &CancellationToken,
) {
    let length = recording.frames.len() as u32;
    if length == 0 {
        debug!("Recording has no frames");
        return;
    }

    let mut cycle = 0u32;
    let mut delivered = 0u64;
    'playback: loop {
        for recorded in &recording.frames {
            if cancel.is_cancelled() {
                break 'playback;
            }

            let mut frame = recorded.clone();
            frame.frame_number = recorded.frame_number.wrapping_add(cycle.wrapping_mul(length));
            frame.timestamps = restamp(&recorded.timestamps, clock.elapsed());

            if let EnqueueOutcome::Dropped = sink.deliver(frame) {
                trace!("Replay frame dropped by mailbox");
            }
            delivered += 1;

            std::thread::sleep(interval);
        }

        if !looping {
            break;
        }
        cycle = cycle.wrapping_add(1);
    }

    debug!(delivered, "Replay finished");
}

/// Move recorded timestamps onto the live clock, keeping both latencies.
fn restamp(recorded: &FrameTimestamps, now: Duration) -> FrameTimestamps {
    FrameTimestamps {
        camera_mid_exposure: now.saturating_sub(recorded.client_latency()),
        transmit: now.saturating_sub(recorded.transit_latency()),
        received: now,
    }
}

impl CaptureSource for ReplaySource {
    fn connect(&mut self, params: &ConnectParams) -> Result<ServerInfo> {
        self.disconnect();

        debug!(server = %params.server_address, "Replay ignores server address");
        self.connected = true;
        self.start_worker();

        info!("Replay started ({} frames at {}Hz)", self.recording.frames.len(), self.rate_hz);
        Ok(self.recording.server.clone())
    }

    fn disconnect(&mut self) {
        self.stop_worker();
        self.connected = false;
    }

    fn test_connection(&mut self) -> Result<()> {
        if self.connected { Ok(()) } else { Err(PosecastError::not_connected("test_connection")) }
    }

    fn data_descriptions(&mut self) -> Result<Vec<AssetDescription>> {
        if !self.connected {
            return Err(PosecastError::not_connected("data_descriptions"));
        }
        Ok(self.recording.descriptions.clone())
    }

    fn attach(&mut self, sink: FrameSink) {
        self.sink = Some(sink);
        if self.connected {
            self.start_worker();
        }
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop_worker();
    }
}
