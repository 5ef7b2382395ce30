//! Consumer-side façade over a capture source.
//!
//! [`PoseTracker`] owns the mailbox the source's callback thread writes into,
//! plus the directory and snapshot that only the polling thread touches. A
//! typical loop refreshes descriptions now and then and calls [`update`] every
//! cycle:
//!
//! ```rust,no_run
//! use posecast::config::TrackerConfig;
//! use posecast::sources::ReplaySource;
//! use posecast::{ConnectParams, PoseTracker};
//!
//! # fn main() -> posecast::Result<()> {
//! let source = ReplaySource::open("session.yaml")?;
//! let mut tracker = PoseTracker::new(source, Default::default(), TrackerConfig::default());
//! tracker.connect(&ConnectParams::new("192.168.1.20"))?;
//!
//! loop {
//!     tracker.update_descriptions()?;
//!     tracker.update();
//!     if let Some(pose) = tracker.rigid_body("Stick") {
//!         println!("{:?}", pose.position());
//!     }
//! }
//! # }
//! ```
//!
//! [`update`]: PoseTracker::update

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{BridgeConfig, TrackerConfig};
use crate::directory::AssetDirectory;
use crate::mailbox::{FrameMailbox, FrameSink, MailboxStats};
use crate::snapshot::{PoseSnapshot, UnresolvedPolicy};
use crate::source::{CaptureSource, ConnectParams};
use crate::types::{Pose, RawFrame, ServerInfo};
use crate::{PosecastError, Result};

/// Latest poses by name, fed by a [`CaptureSource`].
pub struct PoseTracker<S: CaptureSource> {
    source: S,
    mailbox: Arc<FrameMailbox>,
    directory: AssetDirectory,
    snapshot: PoseSnapshot,
    last_batch: Vec<RawFrame>,
    policy: UnresolvedPolicy,
    server: Option<ServerInfo>,
}

impl<S: CaptureSource> PoseTracker<S> {
    /// Wrap `source`, attaching it to `mailbox`.
    pub fn new(mut source: S, mailbox: FrameMailbox, config: TrackerConfig) -> Self {
        let mailbox = Arc::new(mailbox);
        source.attach(FrameSink::new(Arc::clone(&mailbox)));

        Self {
            source,
            mailbox,
            directory: AssetDirectory::new(),
            snapshot: PoseSnapshot::new(),
            last_batch: Vec::new(),
            policy: config.unresolved,
            server: None,
        }
    }

    /// Build mailbox and tracker settings from a full configuration.
    pub fn from_config(source: S, config: &BridgeConfig) -> Result<Self> {
        let mailbox = FrameMailbox::from_config(&config.mailbox)?;
        Ok(Self::new(source, mailbox, config.tracker.clone()))
    }

    /// Connect the source and log the server's diagnostics.
    ///
    /// A failing test request after a successful connect is logged, not returned.
    pub fn connect(&mut self, params: &ConnectParams) -> Result<&ServerInfo> {
        let server = self.source.connect(params).inspect_err(|e| {
            warn!("Unable to connect to capture server: {}", e);
        })?;

        info!(
            host_app = %server.host_app,
            host_app_version = %server.host_app_version,
            protocol_version = %server.protocol_version,
            host_computer = %server.host_computer,
            server_address = %params.server_address,
            "Connected to capture server"
        );
        match server.frame_rate {
            Some(rate) => info!("Mocap frame rate: {:.2}", rate),
            None => warn!("Error getting frame rate"),
        }
        if let Some(samples) = server.analog_samples_per_frame {
            info!("Analog samples per mocap frame: {}", samples);
        }

        match self.source.test_connection() {
            Ok(()) => debug!("Test request answered"),
            Err(e) => warn!("Test request failed: {}", e),
        }

        Ok(&*self.server.insert(server))
    }

    pub fn disconnect(&mut self) {
        self.source.disconnect();
        self.server = None;
        info!("Disconnected from capture server");
    }

    /// Re-read the description list and rebuild the directory.
    ///
    /// On failure the previous directory is kept.
    pub fn update_descriptions(&mut self) -> Result<()> {
        if self.server.is_none() {
            return Err(PosecastError::not_connected("update_descriptions"));
        }

        let descriptions = self.source.data_descriptions()?;
        self.directory.rebuild(&descriptions);
        Ok(())
    }

    /// Drain the mailbox and rebuild the snapshot.
    ///
    /// Returns the number of frames drained; zero means nothing new (or the
    /// mailbox was busy) and the previous snapshot stays in place.
    pub fn update(&mut self) -> usize {
        let batch = self.mailbox.drain();
        if batch.is_empty() {
            return 0;
        }

        self.snapshot.rebuild(&batch, &self.directory, self.policy);
        self.last_batch = batch;
        self.last_batch.len()
    }

    /// Latest pose of a named rigid body.
    pub fn rigid_body(&self, name: &str) -> Option<Pose> {
        self.snapshot.get(name)
    }

    pub fn snapshot(&self) -> &PoseSnapshot {
        &self.snapshot
    }

    pub fn directory(&self) -> &AssetDirectory {
        &self.directory
    }

    /// Frames drained by the most recent non-empty [`update`](Self::update).
    pub fn last_frames(&self) -> &[RawFrame] {
        &self.last_batch
    }

    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.server.is_some()
    }

    pub fn mailbox_stats(&self) -> MailboxStats {
        self.mailbox.stats()
    }

    /// Producer handle for the tracker's mailbox.
    pub fn sink(&self) -> FrameSink {
        FrameSink::new(Arc::clone(&self.mailbox))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
