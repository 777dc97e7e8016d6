//! Minimal UDP socket wrapper for the heartbeat server.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use tracing::{trace, warn};

use crate::protocol::{PacketSender, Result};

/// Binding for a UDP socket.
#[derive(Debug, Clone)]
pub struct SocketBinding {
    socket: Arc<UdpSocket>,
}

impl SocketBinding {
    /// Bind to the provided address.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(false)?;
        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    /// Set socket read timeout.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_read_timeout(timeout)?;
        Ok(())
    }

    /// Set socket write timeout.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send bytes to a remote address.
    pub fn send_to(&self, buf: &[u8], addr: SocketAddr) -> Result<usize> {
        Ok(self.socket.send_to(buf, addr)?)
    }

    /// Receive bytes into the provided buffer.
    pub fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        Ok(self.socket.recv_from(buf)?)
    }

    /// Access the local address for this binding.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

/// Replies go straight back to the datagram's source address.
impl PacketSender<SocketAddr> for SocketBinding {
    fn send_packet(&mut self, context: &SocketAddr, packet: &[u8]) {
        match self.send_to(packet, *context) {
            Ok(sent) => trace!(peer = %context, sent, "status response sent"),
            Err(err) => warn!(peer = %context, error = %err, "status response dropped"),
        }
    }
}
