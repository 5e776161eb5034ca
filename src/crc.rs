//! Masked CRC32-C.
//!
//! Every checksum stored in a record file is a CRC32 using the Castagnoli
//! polynomial, rotated and offset by a fixed delta. Readers that skip the
//! mask will reject every file.

/// Constant added to the rotated CRC.
pub const MASK_DELTA: u32 = 0xa282_ead8;

/// Rotates `crc` right by 15 bits and adds [`MASK_DELTA`].
#[inline]
pub fn mask(crc: u32) -> u32 {
  crc.rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Inverse of [`mask`].
#[inline]
pub fn unmask(masked: u32) -> u32 {
  masked.wrapping_sub(MASK_DELTA).rotate_left(15)
}

/// CRC32-C of `bytes`, masked.
#[inline]
pub fn masked_crc(bytes: &[u8]) -> u32 {
  mask(crc32c::crc32c(bytes))
}

/// Checks `bytes` against a stored masked checksum.
#[inline]
pub fn verify(bytes: &[u8], expected: u32) -> bool {
  masked_crc(bytes) == expected
}
