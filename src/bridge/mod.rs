//! Republishing tracked rigid bodies to an external transport.
//!
//! The publish path deliberately differs from the snapshot: only bodies the
//! server flagged as tracked in a frame are forwarded, one [`WireRecord`] per
//! body per frame. Nothing is buffered or retried; if the transport is not
//! connected or a send fails, the rest of that frame is skipped.
//!
//! ```rust
//! use posecast::bridge::{PublishBridge, Transport, WireRecord};
//! use posecast::types::{RawFrame, RigidBodyRecord};
//!
//! #[derive(Default)]
//! struct Collect(Vec<WireRecord>);
//!
//! impl Transport for Collect {
//!     fn is_connected(&self) -> bool {
//!         true
//!     }
//!
//!     fn send(&mut self, payload: &[u8]) -> posecast::Result<()> {
//!         self.0.push(WireRecord::from_bytes(payload)?);
//!         Ok(())
//!     }
//! }
//!
//! let mut bridge = PublishBridge::new(Collect::default());
//! let frame = RawFrame::new(
//!     1,
//!     vec![
//!         RigidBodyRecord::new(7, [1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]),
//!         RigidBodyRecord::new(8, [0.0; 3], [0.0, 0.0, 0.0, 1.0]).with_tracking(false),
//!     ],
//! );
//!
//! assert_eq!(bridge.publish_frame(&frame), 1);
//! assert_eq!(bridge.transport().0[0].id, 7);
//! ```

mod record;
mod transport;
pub mod udp;
pub mod vector;

pub use record::{WIRE_RECORD_SIZE, WireRecord};
pub use transport::Transport;
pub use udp::{UdpPublisher, UdpSubscriber};
pub use vector::{VectorReplier, VectorRequester, decode_vector, encode_vector};

use tracing::{debug, trace};

use crate::types::RawFrame;

/// Running counters for a bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Records handed to the transport
    pub published: u64,
    /// Bodies left out because they were not tracked in their frame
    pub skipped_untracked: u64,
    /// Frames not (fully) published because the transport was down or failed
    pub failed: u64,
}

/// Stateless frame-to-record publisher over a [`Transport`].
pub struct PublishBridge<T: Transport> {
    transport: T,
    stats: BridgeStats,
}

impl<T: Transport> PublishBridge<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, stats: BridgeStats::default() }
    }

    /// Publish every tracked body of `frame`; returns records sent.
    pub fn publish_frame(&mut self, frame: &RawFrame) -> usize {
        if !self.transport.is_connected() {
            trace!(frame = frame.frame_number, "Transport not connected, skipping frame");
            self.stats.failed += 1;
            return 0;
        }

        let mut sent = 0;
        for body in &frame.rigid_bodies {
            if !body.tracking_valid() {
                self.stats.skipped_untracked += 1;
                continue;
            }

            let record = WireRecord::from(body);
            if let Err(e) = self.transport.send(&record.to_bytes()) {
                debug!(frame = frame.frame_number, id = body.id, "Publish failed: {}", e);
                self.stats.failed += 1;
                break;
            }
            sent += 1;
        }

        self.stats.published += sent as u64;
        sent
    }

    /// Publish a drained batch in arrival order.
    pub fn publish_frames(&mut self, frames: &[RawFrame]) -> usize {
        frames.iter().map(|frame| self.publish_frame(frame)).sum()
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PosecastError;
    use crate::test_utils::crowded_frame;
    use crate::types::RigidBodyRecord;

    #[derive(Default)]
    struct MemoryTransport {
        connected: bool,
        fail_after: Option<usize>,
        sent: Vec<WireRecord>,
    }

    impl Transport for MemoryTransport {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn send(&mut self, payload: &[u8]) -> crate::Result<()> {
            if self.fail_after.is_some_and(|limit| self.sent.len() >= limit) {
                return Err(PosecastError::transport(
                    "memory",
                    std::io::Error::from(std::io::ErrorKind::BrokenPipe),
                ));
            }
            self.sent.push(WireRecord::from_bytes(payload)?);
            Ok(())
        }
    }

    fn connected() -> MemoryTransport {
        MemoryTransport { connected: true, ..MemoryTransport::default() }
    }

    #[test]
    fn only_tracked_bodies_are_published() {
        let mut bridge = PublishBridge::new(connected());
        let frame = RawFrame::new(
            1,
            vec![
                RigidBodyRecord::new(7, [1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]),
                RigidBodyRecord::new(8, [4.0, 5.0, 6.0], [0.0, 0.0, 0.0, 1.0]).with_tracking(false),
            ],
        );

        assert_eq!(bridge.publish_frame(&frame), 1);
        let sent = &bridge.transport().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, 7);
        assert_eq!((sent[0].x, sent[0].y, sent[0].z, sent[0].qw), (1.0, 2.0, 3.0, 1.0));
        assert_eq!(bridge.stats().skipped_untracked, 1);
    }

    #[test]
    fn one_record_per_tracked_body_per_frame() {
        let mut bridge = PublishBridge::new(connected());
        let frames = vec![crowded_frame(1, 6), crowded_frame(2, 6)];

        assert_eq!(bridge.publish_frames(&frames), 6);
        let ids: Vec<i32> = bridge.transport().sent.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 2, 4, 0, 2, 4]);
    }

    #[test]
    fn disconnected_transport_skips_cycle() {
        let mut bridge = PublishBridge::new(MemoryTransport::default());
        assert_eq!(bridge.publish_frame(&crowded_frame(1, 4)), 0);
        assert_eq!(bridge.stats(), BridgeStats { published: 0, skipped_untracked: 0, failed: 1 });
    }

    #[test]
    fn send_failure_abandons_rest_of_frame() {
        let mut bridge = PublishBridge::new(MemoryTransport { fail_after: Some(1), ..connected() });
        assert_eq!(bridge.publish_frame(&crowded_frame(1, 6)), 1);
        assert_eq!(bridge.stats().failed, 1);
        assert_eq!(bridge.stats().published, 1);
    }
}
