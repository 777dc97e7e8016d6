//! Table entries and packet kinds

use std::fmt;

use super::{ENTRY_SIZE, HEARTBEAT_MAGIC, PACKET_SIZE, STATUS_QUERY, codec};

/// One monitored variable's record
///
/// # Wire Format
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |        Timestamp (2)          |   From (1)    |   Value (1)   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    /// Tick of the last accepted heartbeat (wraps at 2^16)
    pub timestamp: u16,
    /// Opaque tag naming the reporting source
    pub from: u8,
    /// Opaque payload reported by the source
    pub value: u8,
}

impl Entry {
    /// Create an entry
    #[must_use]
    pub const fn new(timestamp: u16, from: u8, value: u8) -> Self {
        Self {
            timestamp,
            from,
            value,
        }
    }

    /// Convert to bytes (big-endian timestamp)
    #[must_use]
    pub fn to_bytes(self) -> [u8; ENTRY_SIZE] {
        let mut bytes = [0u8; ENTRY_SIZE];
        codec::store_u16(&mut bytes, self.timestamp);
        bytes[2] = self.from;
        bytes[3] = self.value;
        bytes
    }

    /// Parse from the first four bytes of `bytes`
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            timestamp: codec::fetch_u16(bytes),
            from: bytes[2],
            value: bytes[3],
        }
    }

    /// Whether no heartbeat has ever been recorded (or it carried all zeros)
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} from={:#04x} value={:#04x}",
            self.timestamp, self.from, self.value
        )
    }
}

/// Kind of inbound packet, decided by its discriminator bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    /// Heartbeat update for one variable
    Heartbeat,
    /// `AreyouOK` status query
    StatusQuery,
}

impl PacketKind {
    /// Classify a raw packet
    ///
    /// The heartbeat discriminator wins over the query literal; packets shorter
    /// than [`PACKET_SIZE`] are never recognized.
    #[must_use]
    pub fn classify(packet: &[u8]) -> Option<Self> {
        if packet.len() < PACKET_SIZE {
            return None;
        }
        if packet[4] == HEARTBEAT_MAGIC {
            Some(Self::Heartbeat)
        } else if packet[..PACKET_SIZE] == STATUS_QUERY[..] {
            Some(Self::StatusQuery)
        } else {
            None
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Heartbeat => "Heartbeat",
            Self::StatusQuery => "StatusQuery",
        };
        write!(f, "{name}")
    }
}
