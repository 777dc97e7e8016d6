//! Fixed-width big-endian integer codec
//!
//! Callers guarantee the slice is long enough; a short slice panics like any
//! out-of-bounds index.

/// Store `value` into `out[0..2]`, most significant byte first.
#[inline]
pub fn store_u16(out: &mut [u8], value: u16) {
    out[..2].copy_from_slice(&value.to_be_bytes());
}

/// Store `value` into `out[0..4]`, most significant byte first.
#[inline]
pub fn store_u32(out: &mut [u8], value: u32) {
    out[..4].copy_from_slice(&value.to_be_bytes());
}

/// Read a big-endian `u16` from `bytes[0..2]`.
#[inline]
#[must_use]
pub fn fetch_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Read a big-endian `u32` from `bytes[0..4]`.
#[inline]
#[must_use]
pub fn fetch_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
