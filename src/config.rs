//! YAML configuration.
//!
//! Every section has defaults, so an empty document is a valid configuration:
//!
//! ```rust
//! use posecast::config::BridgeConfig;
//!
//! let config = BridgeConfig::from_yaml_str(
//!     r#"
//! capture:
//!   server_address: 192.168.1.20
//! mailbox:
//!   capacity: 1
//!   lock_timeout_ms: 5
//! publish:
//!   endpoint: 127.0.0.1:5511
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.mailbox.capacity, 1);
//! assert_eq!(config.tracker.poll_interval_ms, 5);
//! ```

use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::snapshot::UnresolvedPolicy;
use crate::{PosecastError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub capture: CaptureConfig,
    pub mailbox: MailboxConfig,
    pub tracker: TrackerConfig,
    pub publish: Option<PublishConfig>,
}

/// How the capture client reaches the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[default]
    Multicast,
    Unicast,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Server address; empty means the source decides (e.g. a replay)
    pub server_address: String,
    pub local_address: Option<String>,
    pub connection_type: ConnectionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    /// Maximum queued frames; 1 keeps only the newest
    pub capacity: usize,
    /// Bound on lock acquisition for both producer and consumer
    pub lock_timeout_ms: u64,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self { capacity: 1, lock_timeout_ms: 5 }
    }
}

impl MailboxConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub unresolved: UnresolvedPolicy,
    /// Consumer poll period used by the async driver
    pub poll_interval_ms: u64,
    /// How often the driver re-reads the description list
    pub description_refresh_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            unresolved: UnresolvedPolicy::default(),
            poll_interval_ms: 5,
            description_refresh_ms: 1000,
        }
    }
}

impl TrackerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn description_refresh(&self) -> Duration {
        Duration::from_millis(self.description_refresh_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(PosecastError::config("tracker.poll_interval_ms must be non-zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Destination as `host:port`
    pub endpoint: String,
}

impl PublishConfig {
    /// Resolve the endpoint to a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.endpoint
            .to_socket_addrs()
            .map_err(|e| PosecastError::config(format!("endpoint '{}': {}", self.endpoint, e)))?
            .next()
            .ok_or_else(|| {
                PosecastError::config(format!("endpoint '{}' resolved to nothing", self.endpoint))
            })
    }
}

impl BridgeConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: BridgeConfig = if yaml.trim().is_empty() {
            BridgeConfig::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| PosecastError::file_error(path.to_path_buf(), e))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mailbox.capacity == 0 {
            return Err(PosecastError::config("mailbox.capacity must be at least 1"));
        }
        self.tracker.validate()?;
        if let Some(publish) = &self.publish {
            publish.socket_addr()?;
        }
        Ok(())
    }
}
