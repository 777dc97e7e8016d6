//! Status response decoding
//!
//! Used by monitoring clients to read the table a server sent back.

use bytes::Bytes;

use super::{CHECKSUM_SIZE, ENTRY_SIZE, Entry, Error, Result, adler32, codec};

/// Verified status response
///
/// # Format
///
/// ```text
/// [CHECKSUM (4 bytes)] [ENTRY 0 (4 bytes)] ... [ENTRY N-1 (4 bytes)]
/// ```
///
/// Holds the received buffer without copying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    bytes: Bytes,
}

impl StatusResponse {
    /// Decode a response, verifying its checksum
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is shorter than the checksum field
    /// - Length is not a whole number of entries
    /// - Checksum doesn't match
    pub fn decode(bytes: Bytes) -> Result<Self> {
        let len = bytes.len();
        if len < CHECKSUM_SIZE {
            return Err(Error::BufferTooSmall {
                needed: CHECKSUM_SIZE,
                got: len,
            });
        }
        if (len - CHECKSUM_SIZE) % ENTRY_SIZE != 0 {
            return Err(Error::InvalidTableLength { len });
        }

        let found = codec::fetch_u32(&bytes);
        let expected = adler32(&bytes[CHECKSUM_SIZE..]);
        if found != expected {
            return Err(Error::ChecksumMismatch { expected, found });
        }

        Ok(Self { bytes })
    }

    /// Embedded checksum
    #[must_use]
    pub fn checksum(&self) -> u32 {
        codec::fetch_u32(&self.bytes)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        (self.bytes.len() - CHECKSUM_SIZE) / ENTRY_SIZE
    }

    /// Whether the response carries no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry at `index`, if present
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<Entry> {
        self.bytes[CHECKSUM_SIZE..]
            .chunks_exact(ENTRY_SIZE)
            .nth(index)
            .map(Entry::from_bytes)
    }

    /// Iterate over entries in index order
    pub fn entries(&self) -> impl ExactSizeIterator<Item = Entry> + '_ {
        self.bytes[CHECKSUM_SIZE..]
            .chunks_exact(ENTRY_SIZE)
            .map(Entry::from_bytes)
    }

    /// Raw response bytes
    #[must_use]
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }
}
