//! Heartbeat state table
//!
//! The table is a single contiguous buffer: a checksum field followed by one
//! fixed-size entry per variable. The same bytes are sent verbatim as the
//! status response.

use tracing::trace;

use super::{CHECKSUM_SIZE, ENTRY_SIZE, Entry, Error, MAX_VARIABLES, Result, Stats, adler32, codec};

/// Bytes needed for a table of `variables` entries.
///
/// Usable in const context to size static storage for [`Table::from_buffer`].
#[must_use]
pub const fn table_len(variables: usize) -> usize {
    CHECKSUM_SIZE + variables * ENTRY_SIZE
}

/// Fixed-size table of heartbeat entries
///
/// # Layout
///
/// ```text
/// [CHECKSUM (4 bytes)] [ENTRY 0 (4 bytes)] ... [ENTRY N-1 (4 bytes)]
/// ```
///
/// The checksum field is only brought up to date by [`Table::seal`]; updates
/// leave it stale.
///
/// `S` is the backing storage. [`Table::new`] allocates a boxed slice once;
/// [`Table::from_buffer`] wraps any caller-supplied buffer, such as a stack
/// array, and never allocates.
#[derive(Debug, Clone)]
pub struct Table<S = Box<[u8]>> {
    buf: S,
    stats: Stats,
}

impl Table {
    /// Create a zeroed table with `variables` entries
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyVariables`] above [`MAX_VARIABLES`].
    pub fn new(variables: usize) -> Result<Self> {
        check_variables(variables)?;
        Ok(Self {
            buf: vec![0u8; table_len(variables)].into_boxed_slice(),
            stats: Stats::default(),
        })
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> Table<S> {
    /// Wrap caller-supplied storage, zeroing it
    ///
    /// ```rust
    /// use deadman::{Table, table_len};
    ///
    /// let table = Table::from_buffer([0xAAu8; table_len(4)])?;
    /// assert_eq!(table.len(), 4);
    /// # Ok::<(), deadman::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is not a checksum followed by whole
    /// entries, or holds more than [`MAX_VARIABLES`] entries.
    pub fn from_buffer(mut buf: S) -> Result<Self> {
        let len = buf.as_ref().len();
        if len < CHECKSUM_SIZE || (len - CHECKSUM_SIZE) % ENTRY_SIZE != 0 {
            return Err(Error::InvalidTableLength { len });
        }
        check_variables((len - CHECKSUM_SIZE) / ENTRY_SIZE)?;

        buf.as_mut().fill(0);
        Ok(Self {
            buf,
            stats: Stats::default(),
        })
    }

    /// Number of variables
    #[must_use]
    pub fn len(&self) -> usize {
        (self.buf.as_ref().len() - CHECKSUM_SIZE) / ENTRY_SIZE
    }

    /// Whether the table has no variables
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry at `index`, if in range
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<Entry> {
        self.entries_bytes()
            .chunks_exact(ENTRY_SIZE)
            .nth(index)
            .map(Entry::from_bytes)
    }

    /// Iterate over all entries in index order
    pub fn entries(&self) -> impl ExactSizeIterator<Item = Entry> + '_ {
        self.entries_bytes()
            .chunks_exact(ENTRY_SIZE)
            .map(Entry::from_bytes)
    }

    /// Stored checksum field, as of the last [`seal`](Self::seal)
    #[must_use]
    pub fn checksum(&self) -> u32 {
        codec::fetch_u32(self.buf.as_ref())
    }

    /// Raw table bytes: checksum field followed by every entry
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_ref()
    }

    /// Overwrite one entry with a fresh heartbeat
    ///
    /// All three fields are written together; on error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] when `index` is beyond the table.
    pub fn update(&mut self, index: u8, timestamp: u16, from: u8, value: u8) -> Result<()> {
        let len = self.len();
        let start = CHECKSUM_SIZE + usize::from(index) * ENTRY_SIZE;
        let slot = self
            .buf
            .as_mut()
            .get_mut(start..start + ENTRY_SIZE)
            .ok_or(Error::IndexOutOfRange { index, len })?;

        slot.copy_from_slice(&Entry::new(timestamp, from, value).to_bytes());
        trace!(index, timestamp, from, value, "entry updated");
        Ok(())
    }

    /// Recompute the checksum over all entries and store it
    ///
    /// Returns the new checksum. Entry contents are untouched.
    pub fn seal(&mut self) -> u32 {
        let checksum = adler32(self.entries_bytes());
        codec::store_u32(self.buf.as_mut(), checksum);
        checksum
    }

    /// Zero every entry and the checksum field
    pub fn reset(&mut self) {
        self.buf.as_mut().fill(0);
    }

    /// Packet counters since creation or the last [`reset_stats`](Self::reset_stats)
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Clear the packet counters
    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    pub(crate) fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    /// Consume the table, returning its storage
    pub fn into_inner(self) -> S {
        self.buf
    }

    fn entries_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[CHECKSUM_SIZE..]
    }
}

fn check_variables(count: usize) -> Result<()> {
    if count > MAX_VARIABLES {
        return Err(Error::TooManyVariables {
            count,
            max: MAX_VARIABLES,
        });
    }
    Ok(())
}
