//! Heartbeat registry core
//!
//! This module provides the wire format, the checksum, the state table and the
//! packet dispatcher.

mod checksum;
mod codec;
mod dispatch;
mod error;
mod heartbeat;
mod metrics;
mod response;
mod table;
mod types;

pub use checksum::adler32;
pub use codec::{fetch_u16, fetch_u32, store_u16, store_u32};
pub use dispatch::{ManualClock, PacketSender, SystemClock, TickSource};
pub use error::{Error, Result};
pub use heartbeat::Heartbeat;
pub use metrics::Stats;
pub use response::StatusResponse;
pub use table::{Table, table_len};
pub use types::{Entry, PacketKind};

/// Discriminator byte identifying a heartbeat packet (offset 4)
pub const HEARTBEAT_MAGIC: u8 = 0xF1;

/// Status query literal: "AreyouOK" in ASCII
pub const STATUS_QUERY: &[u8; PACKET_SIZE] = b"AreyouOK";

/// Size of every inbound packet in bytes
pub const PACKET_SIZE: usize = 8;

/// Checksum field size in bytes
pub const CHECKSUM_SIZE: usize = 4;

/// Size of one table entry in bytes (timestamp + from + value)
pub const ENTRY_SIZE: usize = 4;

/// Largest table addressable by a one-byte heartbeat index
pub const MAX_VARIABLES: usize = 256;
