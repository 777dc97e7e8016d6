//! Blocking UDP server that feeds datagrams into a heartbeat table.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::protocol::{Error, PACKET_SIZE, Result, SystemClock, Table, TickSource};
use crate::{DEFAULT_PORT, DEFAULT_VARIABLES};

use super::socket::SocketBinding;

/// Default receive buffer size in bytes.
pub const DEFAULT_RECV_BUFFER: usize = 64;

/// Server configuration options.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the UDP socket to.
    pub bind_addr: SocketAddr,
    /// Number of monitored variables.
    pub variables: usize,
    /// Optional read timeout; [`Server::poll_once`] returns `None` when it expires.
    pub read_timeout: Option<Duration>,
    /// Optional write timeout for responses.
    pub write_timeout: Option<Duration>,
    /// Size of the datagram receive buffer (at least one packet).
    pub recv_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            variables: DEFAULT_VARIABLES,
            read_timeout: None,
            write_timeout: None,
            recv_buffer: DEFAULT_RECV_BUFFER,
        }
    }
}

/// Heartbeat server owning its table, clock and socket.
///
/// Datagrams are processed one at a time on the calling thread, which is what
/// keeps the table single-writer.
#[derive(Debug)]
pub struct Server<K = SystemClock> {
    socket: SocketBinding,
    table: Table,
    clock: K,
    buf: Box<[u8]>,
}

impl Server {
    /// Bind a server stamping entries with [`SystemClock`].
    pub fn bind(config: ServerConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<K: TickSource> Server<K> {
    /// Bind a server with a custom tick source.
    pub fn with_clock(config: ServerConfig, clock: K) -> Result<Self> {
        let table = Table::new(config.variables)?;
        let socket = SocketBinding::bind(config.bind_addr)?;
        socket.set_read_timeout(config.read_timeout)?;
        socket.set_write_timeout(config.write_timeout)?;

        info!(
            addr = %socket.local_addr()?,
            variables = config.variables,
            "heartbeat server listening"
        );

        Ok(Self {
            socket,
            table,
            clock,
            buf: vec![0u8; config.recv_buffer.max(PACKET_SIZE)].into_boxed_slice(),
        })
    }

    /// Local address of the bound socket.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Current table state.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Mutable access to the table, e.g. to reset it.
    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    /// Receive and process a single datagram.
    ///
    /// Returns `Ok(None)` when the read timeout expired, otherwise whether the
    /// datagram was handled. Errors tied to a single datagram (a peer's ICMP
    /// reset, an oversized datagram) count as an unhandled datagram.
    #[instrument(level = "trace", skip(self))]
    pub fn poll_once(&mut self) -> Result<Option<bool>> {
        let (len, peer) = match self.socket.recv_from(&mut self.buf) {
            Ok(received) => received,
            Err(Error::Io(err)) if is_timeout(&err) => return Ok(None),
            Err(Error::Io(err)) if is_per_datagram(&err) => {
                warn!(error = %err, "datagram dropped");
                return Ok(Some(false));
            }
            Err(err) => return Err(err),
        };

        let handled =
            self.table
                .process_packet(&self.buf[..len], &self.clock, &mut self.socket, &peer);
        if !handled {
            debug!(%peer, len, "datagram ignored");
        }
        Ok(Some(handled))
    }

    /// Serve until the socket fails for a reason not tied to one datagram.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.poll_once()?;
        }
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Winsock `WSAEMSGSIZE`: datagram larger than the receive buffer.
#[cfg(windows)]
const WSAEMSGSIZE: i32 = 10_040;

fn is_per_datagram(err: &io::Error) -> bool {
    #[cfg(windows)]
    if err.raw_os_error() == Some(WSAEMSGSIZE) {
        return true;
    }
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionRefused
    )
}
