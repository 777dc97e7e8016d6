//! Heartbeat packet
//!
//! Sent by a monitored source to refresh one variable.

use super::{CHECKSUM_SIZE, Error, HEARTBEAT_MAGIC, PACKET_SIZE, Result, adler32, codec};

/// Decoded heartbeat update
///
/// # Wire Format
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |               Adler-32 of the next four bytes (4)             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Magic (0xF1) |     Index     |     From      |     Value     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Heartbeat {
    /// Position of the variable in the table
    pub index: u8,
    /// Opaque source tag
    pub from: u8,
    /// Opaque payload
    pub value: u8,
}

impl Heartbeat {
    /// Create a heartbeat
    #[must_use]
    pub const fn new(index: u8, from: u8, value: u8) -> Self {
        Self { index, from, value }
    }

    /// Encode and seal with the payload checksum
    #[must_use]
    pub fn encode(&self) -> [u8; PACKET_SIZE] {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[4] = HEARTBEAT_MAGIC;
        bytes[5] = self.index;
        bytes[6] = self.from;
        bytes[7] = self.value;
        let checksum = adler32(&bytes[CHECKSUM_SIZE..]);
        codec::store_u32(&mut bytes, checksum);
        bytes
    }

    /// Decode a heartbeat, verifying its checksum
    ///
    /// Only the first [`PACKET_SIZE`] bytes are read. The index is not checked
    /// against any table here.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is shorter than 8 bytes
    /// - Discriminator byte is not [`HEARTBEAT_MAGIC`]
    /// - Checksum doesn't match
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < PACKET_SIZE {
            return Err(Error::BufferTooSmall {
                needed: PACKET_SIZE,
                got: bytes.len(),
            });
        }
        if bytes[4] != HEARTBEAT_MAGIC {
            return Err(Error::UnknownPacket {
                discriminator: bytes[4],
            });
        }

        let found = codec::fetch_u32(bytes);
        let expected = adler32(&bytes[CHECKSUM_SIZE..PACKET_SIZE]);
        if found != expected {
            return Err(Error::ChecksumMismatch { expected, found });
        }

        Ok(Self::new(bytes[5], bytes[6], bytes[7]))
    }
}
