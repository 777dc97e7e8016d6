//! Registry error types

use thiserror::Error;

/// Reasons a packet or buffer was rejected
#[derive(Error, Debug)]
pub enum Error {
    /// Embedded checksum does not match the payload
    #[error("checksum mismatch: expected {expected:#010x}, got {found:#010x}")]
    ChecksumMismatch {
        /// Checksum computed over the payload
        expected: u32,
        /// Checksum carried by the packet
        found: u32,
    },

    /// Heartbeat targets a variable the table does not have
    #[error("variable index {index} out of range (table has {len})")]
    IndexOutOfRange {
        /// Requested index
        index: u8,
        /// Number of variables in the table
        len: usize,
    },

    /// Packet is neither a heartbeat nor a status query
    #[error("unrecognized packet (byte 4 = {discriminator:#04x})")]
    UnknownPacket {
        /// Byte found at the discriminator offset
        discriminator: u8,
    },

    /// Buffer too small
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Table buffer is not a checksum followed by whole entries
    #[error("invalid table length: {len} bytes")]
    InvalidTableLength {
        /// Offending length
        len: usize,
    },

    /// More variables than a one-byte index can address
    #[error("too many variables: {count} (max {max})")]
    TooManyVariables {
        /// Requested count
        count: usize,
        /// Maximum allowed
        max: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
