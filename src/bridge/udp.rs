//! UDP publisher and subscriber for wire records

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use tracing::{debug, info, warn};

use super::{Transport, WIRE_RECORD_SIZE, WireRecord};
use crate::{PosecastError, Result};

/// Bind an ephemeral local socket of the same address family as `remote`.
pub(super) fn ephemeral_socket_for(remote: &SocketAddr) -> std::io::Result<UdpSocket> {
    let local: SocketAddr = if remote.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    UdpSocket::bind(local)
}

pub(super) fn resolve(endpoint: &str) -> Result<SocketAddr> {
    endpoint
        .to_socket_addrs()
        .map_err(|e| PosecastError::transport(endpoint, e))?
        .next()
        .ok_or_else(|| {
            PosecastError::transport(
                endpoint,
                std::io::Error::new(ErrorKind::AddrNotAvailable, "endpoint resolved to nothing"),
            )
        })
}

/// Sends each record as one datagram to a fixed `host:port`.
#[derive(Debug)]
pub struct UdpPublisher {
    socket: UdpSocket,
    endpoint: String,
}

impl UdpPublisher {
    pub fn connect(endpoint: &str) -> Result<Self> {
        let remote = resolve(endpoint)?;
        let socket = ephemeral_socket_for(&remote)
            .and_then(|socket| socket.connect(remote).map(|()| socket))
            .map_err(|e| PosecastError::transport(endpoint, e))?;

        info!("Publisher connected to {}", endpoint);
        Ok(Self { socket, endpoint: endpoint.to_string() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for UdpPublisher {
    fn is_connected(&self) -> bool {
        self.socket.peer_addr().is_ok()
    }

    fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.socket.send(payload).map_err(|e| PosecastError::transport(&self.endpoint, e))?;
        Ok(())
    }
}

/// Receives wire records, keeping only the newest pending one.
#[derive(Debug)]
pub struct UdpSubscriber {
    socket: UdpSocket,
}

impl UdpSubscriber {
    pub fn bind(endpoint: &str) -> Result<Self> {
        let socket = UdpSocket::bind(resolve(endpoint)?)
            .and_then(|socket| socket.set_nonblocking(true).map(|()| socket))
            .map_err(|e| PosecastError::transport(endpoint, e))?;

        debug!("Subscriber bound to {}", endpoint);
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(|e| PosecastError::transport("subscriber", e))
    }

    /// Read every pending datagram without blocking and return the newest
    /// valid record, if any arrived.
    pub fn poll(&self) -> Result<Option<WireRecord>> {
        let mut latest = None;
        let mut buffer = [0u8; WIRE_RECORD_SIZE * 2];

        loop {
            match self.socket.recv(&mut buffer) {
                Ok(len) => match WireRecord::from_bytes(&buffer[..len]) {
                    Ok(record) => latest = Some(record),
                    Err(e) => warn!("Discarding malformed datagram: {}", e),
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(PosecastError::transport("subscriber", e)),
            }
        }

        Ok(latest)
    }

    /// Like [`poll`](Self::poll) but keeps every pending record, oldest first.
    pub fn poll_all(&self) -> Result<Vec<WireRecord>> {
        let mut records = Vec::new();
        let mut buffer = [0u8; WIRE_RECORD_SIZE * 2];

        loop {
            match self.socket.recv(&mut buffer) {
                Ok(len) => match WireRecord::from_bytes(&buffer[..len]) {
                    Ok(record) => records.push(record),
                    Err(e) => warn!("Discarding malformed datagram: {}", e),
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(PosecastError::transport("subscriber", e)),
            }
        }

        Ok(records)
    }
}
