//! Ogg page checksum.
//!
//! CRC-32 with generator 0x04C11DB7, no reflection, zero initial value
//! and no final xor. This is not the zip/png CRC-32.

/// CRC lookup table for Ogg.
static CRC_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut r = (i as u32) << 24;
        let mut j = 0;
        while j < 8 {
            if r & 0x80000000 != 0 {
                r = (r << 1) ^ 0x04c11db7;
            } else {
                r <<= 1;
            }
            j += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
};

/// Continues a checksum over more bytes.
pub fn crc32_update(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        crc = (crc << 8) ^ CRC_TABLE[((crc >> 24) as u8 ^ byte) as usize];
    }
    crc
}

/// Calculates the checksum of a buffer.
pub fn crc32(data: &[u8]) -> u32 {
    crc32_update(0, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_empty() {
        assert_eq!(crc32(&[]), 0);
    }

    #[test]
    fn test_crc32_table() {
        assert_eq!(CRC_TABLE[0], 0);
        assert_eq!(CRC_TABLE[1], 0x04c11db7);
        assert_eq!(CRC_TABLE[255], 0xb1f740b4);
    }

    #[test]
    fn test_crc32_known_value() {
        // CRC-32/POSIX without the final complement
        assert_eq!(crc32(b"123456789"), 0x89a1897f);
    }

    #[test]
    fn test_crc32_not_zip_variant() {
        assert_ne!(crc32(b"123456789"), 0xcbf43926);
    }

    #[test]
    fn test_crc32_update_is_incremental() {
        let data = b"Hello, Ogg world!";
        let whole = crc32(data);
        let split = crc32_update(crc32(&data[..5]), &data[5..]);
        assert_eq!(whole, split);
    }
}
