//! Capture source trait

use crate::Result;
use crate::config::{CaptureConfig, ConnectionType};
use crate::mailbox::FrameSink;
use crate::types::{AssetDescription, ServerInfo};

/// Where and how to reach the capture server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectParams {
    pub server_address: String,
    pub local_address: Option<String>,
    pub connection_type: ConnectionType,
}

impl ConnectParams {
    pub fn new(server_address: impl Into<String>) -> Self {
        Self { server_address: server_address.into(), ..Self::default() }
    }
}

impl From<&CaptureConfig> for ConnectParams {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            server_address: config.server_address.clone(),
            local_address: config.local_address.clone(),
            connection_type: config.connection_type,
        }
    }
}

/// A motion-capture client.
///
/// Implementations wrap a vendor client (or a recording) that owns its own
/// callback thread. Once a [`FrameSink`] is attached, every frame the client
/// receives is copied into a [`crate::types::RawFrame`] and handed to the sink
/// from that thread; the sink never blocks it for longer than the mailbox lock
/// timeout.
pub trait CaptureSource: Send + 'static {
    /// Connect to the server and report what it said about itself.
    ///
    /// Any previous connection is closed first.
    fn connect(&mut self, params: &ConnectParams) -> Result<ServerInfo>;

    /// Close the connection and stop delivering frames.
    fn disconnect(&mut self);

    /// Round-trip a test request to the server.
    fn test_connection(&mut self) -> Result<()>;

    /// Current description list.
    fn data_descriptions(&mut self) -> Result<Vec<AssetDescription>>;

    /// Register the frame handler. Replaces any previously attached sink.
    fn attach(&mut self, sink: FrameSink);
}

impl<S: CaptureSource + ?Sized> CaptureSource for Box<S> {
    fn connect(&mut self, params: &ConnectParams) -> Result<ServerInfo> {
        (**self).connect(params)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }

    fn test_connection(&mut self) -> Result<()> {
        (**self).test_connection()
    }

    fn data_descriptions(&mut self) -> Result<Vec<AssetDescription>> {
        (**self).data_descriptions()
    }

    fn attach(&mut self, sink: FrameSink) {
        (**self).attach(sink)
    }
}
