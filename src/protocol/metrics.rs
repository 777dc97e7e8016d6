use super::{Error, PacketKind};

/// Per-table packet counters.
///
/// Kept inside each [`Table`](super::Table) rather than in globals so that
/// independent tables never see each other's traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Heartbeats that updated an entry
    pub heartbeats: u64,
    /// Status queries answered
    pub queries: u64,
    /// Heartbeats dropped for a bad checksum
    pub checksum_errors: u64,
    /// Heartbeats dropped for an index beyond the table
    pub index_errors: u64,
    /// Packets matching neither format
    pub unknown: u64,
}

impl Stats {
    #[inline]
    pub(crate) fn record_handled(&mut self, kind: PacketKind) {
        let counter = match kind {
            PacketKind::Heartbeat => &mut self.heartbeats,
            PacketKind::StatusQuery => &mut self.queries,
        };
        *counter = counter.saturating_add(1);
    }

    #[inline]
    pub(crate) fn record_rejected(&mut self, err: &Error) {
        let counter = match err {
            Error::ChecksumMismatch { .. } => &mut self.checksum_errors,
            Error::IndexOutOfRange { .. } => &mut self.index_errors,
            _ => &mut self.unknown,
        };
        *counter = counter.saturating_add(1);
    }

    /// Packets seen in total
    #[must_use]
    pub fn total(&self) -> u64 {
        self.heartbeats
            .saturating_add(self.queries)
            .saturating_add(self.rejected())
    }

    /// Packets dropped for any reason
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.checksum_errors
            .saturating_add(self.index_errors)
            .saturating_add(self.unknown)
    }
}
