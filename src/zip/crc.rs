//! Table-driven CRC-32 with the standard ZIP/gzip polynomial.
//!
//! The 256-entry lookup table is built on first use behind a [`OnceLock`]
//! and never mutated afterward, so concurrent archive operations can share
//! it without locking.

use std::sync::OnceLock;

/// Reflected form of the ZIP/gzip generator polynomial.
const POLYNOMIAL: u32 = 0xEDB8_8320;

static CRC_TABLE: OnceLock<[u32; 256]> = OnceLock::new();

fn table() -> &'static [u32; 256] {
    CRC_TABLE.get_or_init(|| {
        let mut table = [0u32; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            let mut c = i as u32;
            for _ in 0..8 {
                c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            }
            *slot = c;
        }
        table
    })
}

/// CRC-32 of `data`, as stored in ZIP local and central headers.
pub fn crc32(data: &[u8]) -> u32 {
    crc32_seeded(data, 0)
}

/// CRC-32 continuing from a previous result, for callers hashing data in
/// chunks. A seed of 0 starts a fresh checksum.
pub fn crc32_seeded(data: &[u8], seed: u32) -> u32 {
    let table = table();
    let mut crc = seed ^ 0xFFFF_FFFF;
    for &byte in data {
        crc = table[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc ^ 0xFFFF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_check_value() {
        // The standard CRC-32 check vector.
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn empty_input() {
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn ascii_vector() {
        // Cross-checked against `python3 -c 'import zlib; ...'`.
        assert_eq!(crc32(b"hello world"), 0x0D4A_1185);
    }

    #[test]
    fn seeded_chunks_match_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let (head, tail) = data.split_at(17);
        let chunked = crc32_seeded(tail, crc32(head));
        assert_eq!(chunked, crc32(data));
    }
}
