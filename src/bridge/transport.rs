//! Transport seam for published records

use crate::Result;

/// Outbound message transport.
///
/// Connection management, socket options and reconnection belong to the
/// implementation. The bridge only asks whether sending makes sense right now
/// and hands over one encoded record per call.
pub trait Transport: Send + 'static {
    /// Whether the transport can accept messages at the moment.
    fn is_connected(&self) -> bool;

    /// Send one message.
    fn send(&mut self, payload: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn send(&mut self, payload: &[u8]) -> Result<()> {
        (**self).send(payload)
    }
}
