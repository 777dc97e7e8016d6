//! Packet dispatcher and its collaborators
//!
//! The dispatcher is the only entry point into the table for inbound traffic.
//! It never touches a socket itself; replies go through the injected
//! [`PacketSender`].

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, trace};

use super::{Error, Heartbeat, PACKET_SIZE, PacketKind, Result, Table};

/// Source of the 16-bit tick stamped onto accepted heartbeats
///
/// Units and epoch are up to the implementor; the table treats the value as an
/// opaque ordinal that wraps at 2^16.
pub trait TickSource {
    /// Current tick
    fn now(&self) -> u16;
}

impl<F: Fn() -> u16> TickSource for F {
    fn now(&self) -> u16 {
        self()
    }
}

/// Wall-clock ticks: Unix seconds truncated to 16 bits
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TickSource for SystemClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now(&self) -> u16 {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        secs as u16
    }
}

/// Tick source driven by the caller, for simulations and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    tick: Cell<u16>,
}

impl ManualClock {
    /// Create a clock reading `tick`
    #[must_use]
    pub fn new(tick: u16) -> Self {
        Self {
            tick: Cell::new(tick),
        }
    }

    /// Jump to `tick`
    pub fn set(&self, tick: u16) {
        self.tick.set(tick);
    }

    /// Move forward by `ticks`, wrapping at 2^16
    pub fn advance(&self, ticks: u16) {
        self.tick.set(self.tick.get().wrapping_add(ticks));
    }
}

impl TickSource for ManualClock {
    fn now(&self) -> u16 {
        self.tick.get()
    }
}

/// Delivers a status response back to whoever asked
///
/// `C` is the opaque reply context handed to the dispatcher with the request,
/// for example the sender's socket address. Delivery is fire-and-forget.
pub trait PacketSender<C: ?Sized> {
    /// Send `packet` to `context`
    fn send_packet(&mut self, context: &C, packet: &[u8]);
}

impl<C: ?Sized, F: FnMut(&C, &[u8])> PacketSender<C> for F {
    fn send_packet(&mut self, context: &C, packet: &[u8]) {
        self(context, packet);
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> Table<S> {
    /// Process one inbound packet
    ///
    /// Returns `true` when the packet was a valid heartbeat that updated an
    /// entry, or a status query that was answered. Anything else leaves the
    /// table untouched and returns `false`.
    pub fn process_packet<C, K, P>(
        &mut self,
        packet: &[u8],
        clock: &K,
        sender: &mut P,
        context: &C,
    ) -> bool
    where
        C: ?Sized,
        K: TickSource + ?Sized,
        P: PacketSender<C> + ?Sized,
    {
        self.handle(packet, clock, sender, context).is_ok()
    }

    /// Process one inbound packet, reporting why it was rejected
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Packet is shorter than 8 bytes
    /// - Packet is neither a heartbeat nor a status query
    /// - Heartbeat checksum doesn't match
    /// - Heartbeat index is beyond the table
    pub fn handle<C, K, P>(
        &mut self,
        packet: &[u8],
        clock: &K,
        sender: &mut P,
        context: &C,
    ) -> Result<PacketKind>
    where
        C: ?Sized,
        K: TickSource + ?Sized,
        P: PacketSender<C> + ?Sized,
    {
        let outcome = self.route(packet, clock, sender, context);
        match &outcome {
            Ok(kind) => self.stats_mut().record_handled(*kind),
            Err(err) => {
                debug!(error = %err, "packet rejected");
                self.stats_mut().record_rejected(err);
            }
        }
        outcome
    }

    fn route<C, K, P>(
        &mut self,
        packet: &[u8],
        clock: &K,
        sender: &mut P,
        context: &C,
    ) -> Result<PacketKind>
    where
        C: ?Sized,
        K: TickSource + ?Sized,
        P: PacketSender<C> + ?Sized,
    {
        if packet.len() < PACKET_SIZE {
            return Err(Error::BufferTooSmall {
                needed: PACKET_SIZE,
                got: packet.len(),
            });
        }

        match PacketKind::classify(packet) {
            Some(PacketKind::Heartbeat) => {
                let heartbeat = Heartbeat::decode(packet)?;
                self.update(heartbeat.index, clock.now(), heartbeat.from, heartbeat.value)?;
                Ok(PacketKind::Heartbeat)
            }
            Some(PacketKind::StatusQuery) => {
                let checksum = self.seal();
                trace!(checksum, variables = self.len(), "status response sealed");
                sender.send_packet(context, self.as_bytes());
                Ok(PacketKind::StatusQuery)
            }
            None => Err(Error::UnknownPacket {
                discriminator: packet[4],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Entry, STATUS_QUERY, StatusResponse, adler32};

    fn collect(outbox: &mut Vec<Vec<u8>>) -> impl FnMut(&(), &[u8]) + '_ {
        move |_: &(), packet: &[u8]| outbox.push(packet.to_vec())
    }

    #[test]
    fn test_heartbeat_updates_entry() {
        let mut table = Table::new(2).unwrap();
        let mut outbox = Vec::new();
        let packet = Heartbeat::new(1, 0x05, 0x2A).encode();

        let handled = table.process_packet(&packet, &|| 100u16, &mut collect(&mut outbox), &());

        assert!(handled);
        assert!(outbox.is_empty());
        assert_eq!(table.entry(1), Some(Entry::new(100, 0x05, 0x2A)));
        assert_eq!(table.entry(0), Some(Entry::default()));
        assert_eq!(table.stats().heartbeats, 1);
    }

    #[test]
    fn test_query_sends_sealed_table() {
        let mut table = Table::new(2).unwrap();
        let mut outbox = Vec::new();
        let clock = || 100u16;
        let heartbeat = Heartbeat::new(1, 0x05, 0x2A).encode();

        assert!(table.process_packet(&heartbeat, &clock, &mut collect(&mut outbox), &()));
        assert!(table.process_packet(STATUS_QUERY, &clock, &mut collect(&mut outbox), &()));

        assert_eq!(outbox.len(), 1);
        assert_eq!(
            outbox[0],
            [0x01, 0x68, 0x00, 0x94, 0, 0, 0, 0, 0x00, 0x64, 0x05, 0x2A]
        );
        assert_eq!(table.stats().queries, 1);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let mut table = Table::new(2).unwrap();
        let mut packet = Heartbeat::new(0, 1, 1).encode();
        packet[0] ^= 0x80;

        let result = table.handle(&packet, &|| 1u16, &mut |_: &(), _: &[u8]| {}, &());

        assert!(matches!(result, Err(Error::ChecksumMismatch { .. })));
        assert!(table.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(table.stats().checksum_errors, 1);
    }

    #[test]
    fn test_index_out_of_range_rejected() {
        let mut table = Table::new(2).unwrap();
        let packet = Heartbeat::new(2, 1, 1).encode();

        let result = table.handle(&packet, &|| 1u16, &mut |_: &(), _: &[u8]| {}, &());

        assert!(matches!(
            result,
            Err(Error::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(table.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(table.stats().index_errors, 1);
    }

    #[test]
    fn test_index_far_beyond_table_rejected() {
        let mut table = Table::new(4).unwrap();
        let packet = Heartbeat::new(u8::MAX, 0x11, 0x22).encode();
        assert_eq!(Heartbeat::decode(&packet).unwrap().index, 255);

        let result = table.handle(&packet, &|| 9u16, &mut |_: &(), _: &[u8]| {}, &());

        assert!(matches!(
            result,
            Err(Error::IndexOutOfRange { index: 255, len: 4 })
        ));
        assert!(table.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(table.stats().index_errors, 1);
        assert_eq!(table.stats().heartbeats, 0);
    }

    #[test]
    fn test_short_and_unknown_packets_rejected() {
        let mut table = Table::new(2).unwrap();
        let mut outbox = Vec::new();

        assert!(!table.process_packet(b"Areyou", &|| 1u16, &mut collect(&mut outbox), &()));
        assert!(!table.process_packet(b"HowareU?", &|| 1u16, &mut collect(&mut outbox), &()));

        assert!(outbox.is_empty());
        assert_eq!(table.stats().unknown, 2);
    }

    #[test]
    fn test_system_clock_ticks() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second.wrapping_sub(first) <= 1);
    }

    #[test]
    fn test_manual_clock_wraps() {
        let clock = ManualClock::new(u16::MAX);
        clock.advance(2);
        assert_eq!(clock.now(), 1);
        clock.set(500);
        assert_eq!(clock.now(), 500);
    }

    #[test]
    fn test_context_reaches_sender() {
        let mut table = Table::new(1).unwrap();
        let mut seen = Vec::new();
        let mut sender = |ctx: &u32, packet: &[u8]| seen.push((*ctx, packet.len()));

        assert!(table.process_packet(STATUS_QUERY, &|| 0u16, &mut sender, &42u32));
        assert_eq!(seen, [(42, 8)]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a valid heartbeat changes only its own entry
            #[test]
            fn prop_valid_heartbeat_isolated(
                seed in prop::collection::vec(any::<(u8, u16, u8, u8)>(), 0..16),
                index in 0u8..8,
                from in any::<u8>(),
                value in any::<u8>(),
                tick in any::<u16>(),
            ) {
                let mut table = Table::new(8).unwrap();
                for (i, t, f, v) in seed {
                    let _ = table.update(i % 8, t, f, v);
                }
                let before: Vec<Entry> = table.entries().collect();

                let packet = Heartbeat::new(index, from, value).encode();
                let handled = table.process_packet(&packet, &|| tick, &mut |_: &(), _: &[u8]| {}, &());

                prop_assert!(handled);
                for (i, entry) in table.entries().enumerate() {
                    if i == usize::from(index) {
                        prop_assert_eq!(entry, Entry::new(tick, from, value));
                    } else {
                        prop_assert_eq!(entry, before[i]);
                    }
                }
            }

            /// Property: a heartbeat with a wrong checksum never mutates the table
            #[test]
            fn prop_corrupt_checksum_rejected(
                index in any::<u8>(),
                from in any::<u8>(),
                value in any::<u8>(),
                found in any::<u32>(),
            ) {
                let expected = adler32(&[0xF1, index, from, value]);
                prop_assume!(found != expected);

                let mut table = Table::new(8).unwrap();
                let before = table.as_bytes().to_vec();
                let mut packet = [0u8; 8];
                packet[..4].copy_from_slice(&found.to_be_bytes());
                packet[4..].copy_from_slice(&[0xF1, index, from, value]);

                let handled = table.process_packet(&packet, &|| 7u16, &mut |_: &(), _: &[u8]| {}, &());
                prop_assert!(!handled);
                prop_assert_eq!(table.as_bytes(), &before[..]);
            }

            /// Property: unrecognized packets are ignored
            #[test]
            fn prop_unknown_packet_ignored(packet in any::<[u8; 8]>()) {
                prop_assume!(packet[4] != 0xF1 && &packet != STATUS_QUERY);

                let mut table = Table::new(4).unwrap();
                let mut sent = 0usize;
                let handled = table.process_packet(&packet, &|| 1u16, &mut |_: &(), _: &[u8]| sent += 1, &());

                prop_assert!(!handled);
                prop_assert_eq!(sent, 0);
                prop_assert!(table.as_bytes().iter().all(|&b| b == 0));
            }

            /// Property: every response verifies after any update sequence
            #[test]
            fn prop_response_verifies(
                updates in prop::collection::vec(any::<(u8, u8, u8, u16)>(), 0..32),
            ) {
                let mut table = Table::new(16).unwrap();
                for (index, from, value, tick) in updates {
                    let packet = Heartbeat::new(index, from, value).encode();
                    table.process_packet(&packet, &|| tick, &mut |_: &(), _: &[u8]| {}, &());
                }

                let mut responses: Vec<Vec<u8>> = Vec::new();
                let mut sender = |_: &(), packet: &[u8]| responses.push(packet.to_vec());
                table.process_packet(STATUS_QUERY, &|| 0u16, &mut sender, &());
                table.process_packet(STATUS_QUERY, &|| 0u16, &mut sender, &());

                prop_assert_eq!(&responses[0], &responses[1]);
                let response = StatusResponse::decode(responses.remove(0).into());
                prop_assert!(response.is_ok());
                prop_assert_eq!(response.unwrap().entries().collect::<Vec<_>>(), table.entries().collect::<Vec<_>>());
            }
        }
    }
}
