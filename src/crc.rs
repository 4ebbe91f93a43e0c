//! Crc - CRC-32 checksum engine for save data integrity

use lazy_static::lazy_static;

/// Reflected polynomial for CRC-32/ISO-HDLC
const POLYNOMIAL: u32 = 0xEDB8_8320;

lazy_static! {
    /// Precomputed 256-entry lookup table, one slot per byte value
    static ref TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        for (byte, entry) in table.iter_mut().enumerate() {
            let mut crc = byte as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ POLYNOMIAL
                } else {
                    crc >> 1
                };
            }
            *entry = crc;
        }
        table
    };
}

/// Compute the CRC-32 checksum of a byte buffer.
///
/// Standard reflected CRC-32 (the same algorithm as zlib/PNG). Used
/// identically when writing a record (to embed the checksum) and when
/// reading it back (to verify).
pub fn checksum(bytes: &[u8]) -> u32 {
    let mut acc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        acc = (acc >> 8) ^ TABLE[((acc ^ byte as u32) & 0xFF) as usize];
    }
    acc ^ 0xFFFF_FFFF
}
