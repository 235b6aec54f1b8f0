//! Folded CRC-32 for the retained region
//!
//! The region stores 16 bits of checksum: the raw CRC-32 register
//! (IEEE polynomial, initial value 0xFFFFFFFF, no final inversion)
//! with its high and low halves XORed together.
//!
//! Not a security primitive. It catches incidental corruption: reset
//! mid-write, leftovers from other firmware, power-on noise.

use crc32fast::Hasher;

/// Fold a 32-bit CRC into 16 bits
pub const fn fold(crc: u32) -> u16 {
    ((crc & 0xFFFF) ^ (crc >> 16)) as u16
}

/// Raw CRC-32 register after feeding `chunks` in order
///
/// `crc32fast` finalizes with an inversion; undo it to get the register
/// value the region format is defined over.
pub fn crc32_raw(chunks: &[&[u8]]) -> u32 {
    let mut hasher = Hasher::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    !hasher.finalize()
}

/// Checksum over `magic ‖ stored_len ‖ payload`
///
/// `magic` and `stored_len` are the raw header bytes as persisted.
/// `payload` must already be trimmed to the stored length.
pub fn region_checksum(magic: [u8; 4], stored_len: [u8; 2], payload: &[u8]) -> u16 {
    fold(crc32_raw(&[&magic, &stored_len, payload]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_register_check_value() {
        // Standard CRC-32 check value is 0xCBF43926; the raw register is its inverse
        assert_eq!(crc32_raw(&[b"123456789"]), !0xCBF4_3926);
        assert_eq!(fold(crc32_raw(&[b"123456789"])), 0xF2D2);
    }

    #[test]
    fn test_chunking_is_transparent() {
        let whole = crc32_raw(&[b"magiclenpayload"]);
        let split = crc32_raw(&[b"magi", b"cl", b"en", b"payload"]);
        assert_eq!(whole, split);
    }

    #[test]
    fn test_empty_input_is_initial_register() {
        assert_eq!(crc32_raw(&[]), 0xFFFF_FFFF);
        assert_eq!(fold(0xFFFF_FFFF), 0);
    }

    #[test]
    fn test_header_bytes_participate() {
        let a = region_checksum(0x7550_7921u32.to_ne_bytes(), 3u16.to_ne_bytes(), b"abc");
        let b = region_checksum(0u32.to_ne_bytes(), 3u16.to_ne_bytes(), b"abc");
        let c = region_checksum(0x7550_7921u32.to_ne_bytes(), 2u16.to_ne_bytes(), b"abc");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
