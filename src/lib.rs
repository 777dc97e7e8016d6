//! deadman - a dead-man's-switch heartbeat registry
//!
//! Remote sources report on a fixed set of variables by sending small
//! checksummed heartbeat packets. Each accepted heartbeat stamps the variable's
//! entry with the current tick. A monitoring client asks for the whole table
//! with a status query and decides for itself which variables went quiet.
//!
//! # Quick Start
//!
//! ```rust
//! use deadman::{Heartbeat, STATUS_QUERY, StatusResponse, Table};
//!
//! let mut table = Table::new(2)?;
//! let clock = || 100u16;
//! let mut outbox: Vec<Vec<u8>> = Vec::new();
//! let mut send = |_: &(), packet: &[u8]| outbox.push(packet.to_vec());
//!
//! // A source reports on variable 1
//! let heartbeat = Heartbeat::new(1, 0x05, 0x2A).encode();
//! assert!(table.process_packet(&heartbeat, &clock, &mut send, &()));
//!
//! // A monitor asks for the table
//! assert!(table.process_packet(STATUS_QUERY, &clock, &mut send, &()));
//!
//! let response = StatusResponse::decode(outbox.remove(0).into())?;
//! let entry = response.entry(1).unwrap();
//! assert_eq!((entry.timestamp, entry.from, entry.value), (100, 0x05, 0x2A));
//! # Ok::<(), deadman::Error>(())
//! ```
//!
//! # Features
//!
//! - **Fixed footprint** - the table is one contiguous buffer, sized once
//! - **Adler-32 checksums** - on heartbeats and on every status response
//! - **Lazy sealing** - the table checksum is only recomputed when queried
//! - **Pluggable collaborators** - tick source and packet sender are traits
//! - **UDP server** - a blocking reference transport in [`transport`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod protocol;
pub mod transport;

pub use protocol::{
    CHECKSUM_SIZE, ENTRY_SIZE, Entry, Error, HEARTBEAT_MAGIC, Heartbeat, MAX_VARIABLES,
    ManualClock, PACKET_SIZE, PacketKind, PacketSender, Result, STATUS_QUERY, Stats,
    StatusResponse, SystemClock, Table, TickSource, adler32, table_len,
};
pub use transport::{Server, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default UDP port for the heartbeat server
pub const DEFAULT_PORT: u16 = 3737;

/// Default number of monitored variables (a 260-byte table)
pub const DEFAULT_VARIABLES: usize = 64;
