//! UDP transport for the heartbeat table
//!
//! Each datagram is one packet; status responses go back to the datagram's
//! source address.

mod server;
mod socket;

pub use server::{DEFAULT_RECV_BUFFER, Server, ServerConfig};
pub use socket::SocketBinding;
