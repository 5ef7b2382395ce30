//! Typed numeric vectors for request/reply exchanges.
//!
//! A request is an `f64` vector of a length both sides agree on; so is the
//! reply. The usual exchange asks for the pose of one named body and gets the
//! seven pose components back.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::udp::{ephemeral_socket_for, resolve};
use crate::{PosecastError, Result};

/// Encode values as consecutive native-endian `f64`s.
pub fn encode_vector(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_ne_bytes()).collect()
}

/// Decode exactly `len` native-endian `f64`s.
pub fn decode_vector(bytes: &[u8], len: usize) -> Result<Vec<f64>> {
    if bytes.len() != len * 8 {
        return Err(PosecastError::encoding(format!(
            "expected {} values ({} bytes), got {} bytes",
            len,
            len * 8,
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            f64::from_ne_bytes(word)
        })
        .collect())
}

/// Client side: send a vector, wait for the reply vector.
#[derive(Debug)]
pub struct VectorRequester {
    socket: UdpSocket,
    endpoint: String,
    timeout: Duration,
}

impl VectorRequester {
    pub fn connect(endpoint: &str, timeout: Duration) -> Result<Self> {
        let remote = resolve(endpoint)?;
        let socket = ephemeral_socket_for(&remote)
            .and_then(|socket| socket.connect(remote).map(|()| socket))
            .and_then(|socket| socket.set_read_timeout(Some(timeout)).map(|()| socket))
            .map_err(|e| PosecastError::transport(endpoint, e))?;

        Ok(Self { socket, endpoint: endpoint.to_string(), timeout })
    }

    /// Send `values` and wait up to the timeout for `reply_len` values back.
    pub fn request(&self, values: &[f64], reply_len: usize) -> Result<Vec<f64>> {
        self.socket
            .send(&encode_vector(values))
            .map_err(|e| PosecastError::transport(&self.endpoint, e))?;

        let mut buffer = vec![0u8; reply_len * 8 + 8];
        match self.socket.recv(&mut buffer) {
            Ok(len) => decode_vector(&buffer[..len], reply_len),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Err(PosecastError::Timeout { duration: self.timeout })
            }
            Err(e) => Err(PosecastError::transport(&self.endpoint, e)),
        }
    }
}

/// Server side: answer pending requests from the polling loop.
#[derive(Debug)]
pub struct VectorReplier {
    socket: UdpSocket,
}

impl VectorReplier {
    pub fn bind(endpoint: &str) -> Result<Self> {
        let socket = UdpSocket::bind(resolve(endpoint)?)
            .and_then(|socket| socket.set_nonblocking(true).map(|()| socket))
            .map_err(|e| PosecastError::transport(endpoint, e))?;

        debug!("Replier bound to {}", endpoint);
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(|e| PosecastError::transport("replier", e))
    }

    /// Answer every request waiting on the socket without blocking.
    ///
    /// Requests that do not decode to `request_len` values are logged and
    /// left unanswered. Returns the number of replies sent.
    pub fn serve_pending<F>(&self, request_len: usize, mut handler: F) -> Result<usize>
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        let mut buffer = vec![0u8; request_len * 8 + 8];
        let mut served = 0;

        loop {
            let (len, peer) = match self.socket.recv_from(&mut buffer) {
                Ok(received) => received,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(PosecastError::transport("replier", e)),
            };

            let request = match decode_vector(&buffer[..len], request_len) {
                Ok(request) => request,
                Err(e) => {
                    warn!(%peer, "Ignoring malformed request: {}", e);
                    continue;
                }
            };

            let reply = handler(&request);
            match self.socket.send_to(&encode_vector(&reply), peer) {
                Ok(_) => served += 1,
                Err(e) => warn!(%peer, "Failed to send reply: {}", e),
            }
        }

        if served > 0 {
            trace!(served, "Answered vector requests");
        }
        Ok(served)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_checks_requested_length() {
        let bytes = encode_vector(&[1.0, 2.0, 3.0]);
        assert_eq!(bytes.len(), 24);
        assert_eq!(decode_vector(&bytes, 3).unwrap(), vec![1.0, 2.0, 3.0]);
        assert!(matches!(decode_vector(&bytes, 7), Err(PosecastError::Encoding { .. })));
    }

    #[test]
    fn request_reply_over_loopback() {
        let replier = VectorReplier::bind("127.0.0.1:0").unwrap();
        let endpoint = replier.local_addr().unwrap().to_string();

        let server = std::thread::spawn(move || {
            let deadline = std::time::Instant::now() + Duration::from_secs(2);
            while std::time::Instant::now() < deadline {
                let served = replier
                    .serve_pending(3, |request| {
                        let mut pose = request.to_vec();
                        pose.extend([0.0, 0.0, 0.0, 1.0]);
                        pose
                    })
                    .unwrap();
                if served > 0 {
                    return served;
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            0
        });

        let requester = VectorRequester::connect(&endpoint, Duration::from_secs(2)).unwrap();
        let reply = requester.request(&[1.0, 2.0, 3.0], 7).unwrap();

        assert_eq!(reply, vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(server.join().unwrap(), 1);
    }

    #[test]
    fn request_without_replier_times_out() {
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let endpoint = silent.local_addr().unwrap().to_string();

        let requester = VectorRequester::connect(&endpoint, Duration::from_millis(20)).unwrap();
        assert!(matches!(requester.request(&[0.0; 3], 7), Err(PosecastError::Timeout { .. })));
    }
}
