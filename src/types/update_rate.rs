//! Update rate control for snapshot streams

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Update rate for snapshot streams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every snapshot the driver produces (one per non-empty poll)
    Native,

    /// At most this many snapshots per second.
    /// If the requested rate meets or exceeds the poll rate, Native is used
    Max(u32),
}

impl UpdateRate {
    /// Normalize rate against the driver's poll frequency
    pub fn normalize(self, poll_hz: f64) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(0) => UpdateRate::Native,
            UpdateRate::Max(hz) if hz as f64 >= poll_hz => UpdateRate::Native,
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// Throttle interval, if throttling is needed at all
    pub fn throttle_interval(self, poll_hz: f64) -> Option<Duration> {
        match self.normalize(poll_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_at_or_above_poll_rate_are_native() {
        assert_eq!(UpdateRate::Max(200).normalize(200.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(500).normalize(200.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(0).normalize(200.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(10).normalize(200.0), UpdateRate::Max(10));
    }

    #[test]
    fn throttle_interval_matches_rate() {
        assert_eq!(UpdateRate::Native.throttle_interval(100.0), None);
        assert_eq!(UpdateRate::Max(4).throttle_interval(100.0), Some(Duration::from_millis(250)));
    }
}
