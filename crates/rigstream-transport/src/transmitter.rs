//! Pose transmitter - the producer side of the stream

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use rigstream_core::{PoseFrame, RigError, RigResult};
use rigstream_wire::{encode_frame, MAX_DATAGRAM_SIZE};

/// Sends encoded pose frames to one receiver
pub struct PoseTransmitter {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl PoseTransmitter {
    /// Bind an ephemeral local socket for sending to `destination`
    pub async fn connect(destination: SocketAddr) -> RigResult<Self> {
        let local: SocketAddr = match destination {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| RigError::SocketError(e.to_string()))?;

        Ok(PoseTransmitter {
            socket,
            destination,
        })
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    pub fn local_addr(&self) -> RigResult<SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|e| RigError::SocketError(e.to_string()))
    }

    /// Encode and send a frame, returning the payload size
    pub async fn send_frame(&self, frame: &PoseFrame) -> RigResult<usize> {
        let bytes = encode_frame(frame)?;
        self.send_bytes(&bytes).await
    }

    /// Send a raw payload as-is
    pub async fn send_bytes(&self, bytes: &[u8]) -> RigResult<usize> {
        if bytes.len() > MAX_DATAGRAM_SIZE {
            return Err(RigError::PayloadTooLarge {
                size: bytes.len(),
                max: MAX_DATAGRAM_SIZE,
            });
        }

        self.socket
            .send_to(bytes, self.destination)
            .await
            .map_err(|e| RigError::SocketError(e.to_string()))
    }
}
