//! Driver spawns and manages the pose polling task

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::Result;
use crate::bridge::{BridgeStats, PublishBridge, Transport};
use crate::config::TrackerConfig;
use crate::mailbox::MailboxStats;
use crate::snapshot::PoseSnapshot;
use crate::source::CaptureSource;
use crate::tracker::PoseTracker;

/// Bridge type the driver forwards drained frames to.
pub type DynBridge = PublishBridge<Box<dyn Transport>>;

/// Counters published by the polling task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Polls that drained at least one frame
    pub batches: u64,
    /// Frames drained in total
    pub frames: u64,
    /// Description refreshes that failed
    pub description_errors: u64,
    pub mailbox: MailboxStats,
    pub bridge: Option<BridgeStats>,
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Receiver for rebuilt snapshots; `None` until the first batch and after shutdown
    pub snapshots: watch::Receiver<Option<Arc<PoseSnapshot>>>,
    /// Receiver for running counters
    pub stats: watch::Receiver<DriverStats>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Everything one poll cycle touches, moved onto a blocking thread per cycle.
struct PollState<S: CaptureSource> {
    tracker: PoseTracker<S>,
    bridge: Option<DynBridge>,
    stats: DriverStats,
}

impl<S: CaptureSource> PollState<S> {
    /// Refresh descriptions if due, drain, publish. Returns the rebuilt
    /// snapshot when frames arrived.
    fn cycle(&mut self, refresh: bool) -> Option<Arc<PoseSnapshot>> {
        if refresh {
            if let Err(e) = self.tracker.update_descriptions() {
                self.stats.description_errors += 1;
                warn!("Description refresh failed, keeping previous directory: {}", e);
            }
        }

        let drained = self.tracker.update();
        self.stats.mailbox = self.tracker.mailbox_stats();
        if drained == 0 {
            return None;
        }

        self.stats.batches += 1;
        self.stats.frames += drained as u64;
        trace!(drained, snapshot_len = self.tracker.snapshot().len(), "Snapshot rebuilt");

        if let Some(bridge) = self.bridge.as_mut() {
            bridge.publish_frames(self.tracker.last_frames());
            self.stats.bridge = Some(bridge.stats());
        }

        Some(Arc::new(self.tracker.snapshot().clone()))
    }
}

/// Driver spawns and manages the pose polling task
///
/// The task owns the tracker (and so the capture source). Every poll interval
/// it drains the mailbox, rebuilds the snapshot and, when frames arrived,
/// forwards them to the bridge before publishing the snapshot.
///
/// Description queries, the timed mailbox lock and source shutdown all block,
/// so each cycle runs under `spawn_blocking`; the async task only paces the
/// cycles and publishes their results.
pub struct Driver;

impl Driver {
    /// Spawn the polling task for a connected tracker.
    ///
    /// Must be called from within a tokio runtime. Fails with a `Config`
    /// error if `config` is invalid (e.g. a zero poll interval).
    pub fn spawn<S>(
        tracker: PoseTracker<S>,
        bridge: Option<DynBridge>,
        config: &TrackerConfig,
    ) -> Result<DriverChannels>
    where
        S: CaptureSource,
    {
        config.validate()?;

        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (stats_tx, stats_rx) = watch::channel(DriverStats::default());
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        let poll_interval = config.poll_interval();
        let refresh_interval = config.description_refresh();
        let state = PollState { tracker, bridge, stats: DriverStats::default() };

        tokio::spawn(async move {
            Self::poll_task(state, poll_interval, refresh_interval, snapshot_tx, stats_tx, task_cancel)
                .await;
        });

        Ok(DriverChannels { snapshots: snapshot_rx, stats: stats_rx, cancel })
    }

    async fn poll_task<S>(
        mut state: PollState<S>,
        poll_interval: Duration,
        refresh_interval: Duration,
        snapshot_tx: watch::Sender<Option<Arc<PoseSnapshot>>>,
        stats_tx: watch::Sender<DriverStats>,
        cancel: CancellationToken,
    ) where
        S: CaptureSource,
    {
        info!(poll_ms = poll_interval.as_millis() as u64, "Pose polling task started");

        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_refresh = Instant::now();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Pose polling task cancelled");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let refresh = last_refresh.elapsed() >= refresh_interval;
            if refresh {
                last_refresh = Instant::now();
            }

            let joined = tokio::task::spawn_blocking(move || {
                let snapshot = state.cycle(refresh);
                (state, snapshot)
            })
            .await;

            let snapshot;
            (state, snapshot) = match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("Poll cycle panicked, stopping driver: {}", e);
                    snapshot_tx.send_replace(None);
                    return;
                }
            };

            // Counters move even when nothing was drained (drops, failed refreshes)
            let stats = state.stats;
            stats_tx.send_if_modified(|current| {
                let changed = *current != stats;
                *current = stats;
                changed
            });

            if let Some(snapshot) = snapshot {
                if snapshot_tx.send(Some(snapshot)).is_err() {
                    debug!("Snapshot receivers dropped, shutting down");
                    break;
                }
            }
        }

        let stats = state.stats;
        if let Err(e) = tokio::task::spawn_blocking(move || state.tracker.disconnect()).await {
            warn!("Source disconnect panicked: {}", e);
        }
        snapshot_tx.send_replace(None);
        info!("Pose polling task ended ({} frames in {} batches)", stats.frames, stats.batches);
    }
}
