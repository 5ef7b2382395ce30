//! Streaming connection over a running pose driver

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::bridge::{PublishBridge, Transport, UdpPublisher};
use crate::config::{BridgeConfig, TrackerConfig};
use crate::driver::{Driver, DriverStats, DynBridge};
use crate::source::{CaptureSource, ConnectParams};
use crate::stream::ThrottleExt;
use crate::tracker::PoseTracker;
use crate::types::{Pose, ServerInfo, UpdateRate};
use crate::{PoseSnapshot, Result};

/// Live connection to a capture server
pub struct LiveConnection {
    /// Snapshot watch receiver
    snapshots: watch::Receiver<Option<Arc<PoseSnapshot>>>,

    /// Driver counters
    stats: watch::Receiver<DriverStats>,

    /// Diagnostics reported on connect
    server: Option<ServerInfo>,

    /// Polling frequency of the driver
    poll_hz: f64,

    /// Cancellation token for stopping the driver
    cancel: CancellationToken,
}

impl LiveConnection {
    /// Connect `source` with the capture settings in `config`, load the
    /// asset descriptions and start streaming.
    ///
    /// A `publish` section adds a UDP publisher for tracked bodies.
    pub async fn connect<S>(source: S, config: &BridgeConfig) -> Result<Self>
    where
        S: CaptureSource,
    {
        config.validate()?;

        let mut tracker = PoseTracker::from_config(source, config)?;
        tracker.connect(&ConnectParams::from(&config.capture))?;
        tracker.update_descriptions()?;

        let bridge = match &config.publish {
            Some(publish) => {
                let transport: Box<dyn Transport> = Box::new(UdpPublisher::connect(&publish.endpoint)?);
                Some(PublishBridge::new(transport))
            }
            None => None,
        };

        Self::spawn(tracker, bridge, &config.tracker)
    }

    /// Start streaming from an already connected tracker.
    ///
    /// Fails with a `Config` error if `config` is invalid.
    pub fn spawn<S>(tracker: PoseTracker<S>, bridge: Option<DynBridge>, config: &TrackerConfig) -> Result<Self>
    where
        S: CaptureSource,
    {
        let server = tracker.server_info().cloned();
        let channels = Driver::spawn(tracker, bridge, config)?;
        let poll_hz = 1.0 / config.poll_interval().as_secs_f64();

        info!("Pose connection established ({:.0}Hz polling)", poll_hz);

        Ok(Self { snapshots: channels.snapshots, stats: channels.stats, server, poll_hz, cancel: channels.cancel })
    }

    /// Subscribe to rebuilt snapshots.
    ///
    /// The stream waits for the first snapshot and ends when the driver stops.
    pub fn subscribe(&self, rate: UpdateRate) -> impl Stream<Item = Arc<PoseSnapshot>> + 'static {
        // WatchStream yields the current value first; leading Nones mean no
        // batch has arrived yet, a later None means the driver shut down.
        let snapshots = WatchStream::new(self.snapshots.clone())
            .skip_while(|opt| {
                let is_none = opt.is_none();
                async move { is_none }
            })
            .take_while(|opt| {
                let is_some = opt.is_some();
                async move { is_some }
            })
            .filter_map(|opt| async move { opt });

        match rate.throttle_interval(self.poll_hz) {
            None => snapshots.boxed(),
            Some(interval) => snapshots.throttle(interval).boxed(),
        }
    }

    /// Stream of poses for one body, skipping snapshots that lack it.
    pub fn rigid_body_updates(&self, name: &str, rate: UpdateRate) -> impl Stream<Item = Pose> + 'static {
        let name = name.to_string();
        self.subscribe(rate)
            .filter_map(move |snapshot| {
                let pose = snapshot.get(&name);
                async move { pose }
            })
            .boxed()
    }

    /// Latest snapshot, if any batch has arrived
    pub fn current(&self) -> Option<Arc<PoseSnapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Pose of `name` in the latest snapshot
    pub fn rigid_body(&self, name: &str) -> Option<Pose> {
        self.snapshots.borrow().as_ref().and_then(|snapshot| snapshot.get(name))
    }

    pub fn stats(&self) -> DriverStats {
        *self.stats.borrow()
    }

    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server.as_ref()
    }

    /// Driver polling frequency
    pub fn poll_hz(&self) -> f64 {
        self.poll_hz
    }

    /// Stop the driver; streams end once it has shut down.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for LiveConnection {
    fn drop(&mut self) {
        debug!("Dropping pose connection");
        self.cancel.cancel();
    }
}
