//! Frame hand-off between the capture thread and the polling consumer.
//!
//! The capture client calls back on a thread it owns, at the hardware's rate,
//! and must never be held up by the consumer. [`FrameMailbox`] is a short,
//! depth-bounded queue behind a timed lock: both ends wait at most
//! `lock_timeout` for the lock and otherwise give up for this cycle. The
//! producer drops the new frame; the consumer sees an empty batch.
//!
//! With the default capacity of 1 the mailbox holds only the newest frame.
//!
//! ```rust
//! use posecast::mailbox::{EnqueueOutcome, FrameMailbox};
//! use posecast::types::RawFrame;
//! use std::num::NonZeroUsize;
//! use std::time::Duration;
//!
//! let mailbox = FrameMailbox::new(NonZeroUsize::MIN, Duration::from_millis(5));
//! assert_eq!(mailbox.enqueue(RawFrame::new(1, vec![])), EnqueueOutcome::Stored { evicted: 0 });
//! assert_eq!(mailbox.enqueue(RawFrame::new(2, vec![])), EnqueueOutcome::Stored { evicted: 1 });
//!
//! let batch = mailbox.drain();
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch[0].frame_number, 2);
//! assert!(mailbox.drain().is_empty());
//! ```

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{trace, warn};

use crate::config::MailboxConfig;
use crate::types::RawFrame;

/// Default bound on lock acquisition for either end.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(5);

/// What happened to a frame offered by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Frame was queued; `evicted` older frames were discarded to stay within capacity
    Stored { evicted: usize },
    /// Lock was not acquired within the timeout and the frame was discarded
    Dropped,
}

/// Running counters for a mailbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailboxStats {
    pub enqueued: u64,
    pub dropped: u64,
    pub evicted: u64,
}

/// Depth-bounded, timed-lock frame queue.
#[derive(Debug)]
pub struct FrameMailbox {
    queue: Mutex<VecDeque<RawFrame>>,
    capacity: NonZeroUsize,
    lock_timeout: Duration,
    enqueued: AtomicU64,
    dropped: AtomicU64,
    evicted: AtomicU64,
}

impl FrameMailbox {
    pub fn new(capacity: NonZeroUsize, lock_timeout: Duration) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity.get() + 1)),
            capacity,
            lock_timeout,
            enqueued: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        }
    }

    /// Build from validated configuration.
    pub fn from_config(config: &MailboxConfig) -> crate::Result<Self> {
        let capacity = NonZeroUsize::new(config.capacity)
            .ok_or_else(|| crate::PosecastError::config("mailbox capacity must be at least 1"))?;
        Ok(Self::new(capacity, config.lock_timeout()))
    }

    /// Offer a frame from the producer side.
    ///
    /// Never waits longer than the lock timeout. On success the queue is trimmed
    /// from the head (oldest first) back down to capacity.
    pub fn enqueue(&self, frame: RawFrame) -> EnqueueOutcome {
        let Some(mut queue) = self.queue.try_lock_for(self.lock_timeout) else {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(frame = frame.frame_number, dropped, "Frame dropped: mailbox lock busy");
            return EnqueueOutcome::Dropped;
        };

        queue.push_back(frame);

        let mut evicted = 0;
        while queue.len() > self.capacity.get() {
            if let Some(old) = queue.pop_front() {
                trace!(frame = old.frame_number, "Evicted stale frame");
                evicted += 1;
            }
        }
        drop(queue);

        self.enqueued.fetch_add(1, Ordering::Relaxed);
        if evicted > 0 {
            self.evicted.fetch_add(evicted as u64, Ordering::Relaxed);
        }

        EnqueueOutcome::Stored { evicted }
    }

    /// Take everything currently queued, oldest first.
    ///
    /// Returns an empty batch if the mailbox is empty or the lock could not be
    /// acquired within the timeout; neither case is an error.
    pub fn drain(&self) -> Vec<RawFrame> {
        match self.queue.try_lock_for(self.lock_timeout) {
            Some(mut queue) => {
                let batch: Vec<RawFrame> = queue.drain(..).collect();
                drop(queue);
                batch
            }
            None => {
                trace!("Mailbox lock busy, skipping drain");
                Vec::new()
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    pub fn stats(&self) -> MailboxStats {
        MailboxStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}

impl Default for FrameMailbox {
    fn default() -> Self {
        Self::new(NonZeroUsize::MIN, DEFAULT_LOCK_TIMEOUT)
    }
}

/// Producer handle given to a capture source.
///
/// Cheap to clone; the source keeps one on its callback thread and delivers
/// every copied frame through it.
#[derive(Debug, Clone)]
pub struct FrameSink {
    mailbox: Arc<FrameMailbox>,
}

impl FrameSink {
    pub fn new(mailbox: Arc<FrameMailbox>) -> Self {
        Self { mailbox }
    }

    pub fn deliver(&self, frame: RawFrame) -> EnqueueOutcome {
        self.mailbox.enqueue(frame)
    }
}
