//! Adler-32 checksum
//!
//! Used to validate heartbeat payloads and to seal status responses.

/// Largest prime below 2^16
const MOD_ADLER: u32 = 65_521;

/// Bytes accumulated between modulo reductions.
///
/// `b` stays below `MOD_ADLER + 16 * (MOD_ADLER + 16 * 255)`, far from `u32::MAX`.
const BLOCK: usize = 16;

/// Compute the Adler-32 checksum of `data`.
///
/// # Format
///
/// ```text
/// a = 1 + sum(bytes)            (mod 65521)
/// b = sum of a after each byte  (mod 65521)
/// result = b << 16 | a
/// ```
///
/// The empty input yields `1`.
#[must_use]
pub fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;

    for block in data.chunks(BLOCK) {
        for &byte in block {
            a += u32::from(byte);
            b += a;
        }
        a %= MOD_ADLER;
        b %= MOD_ADLER;
    }

    (b << 16) | a
}
