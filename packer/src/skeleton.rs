//! Duration hint packet.
//!
//! An 80-byte packet shaped like an Ogg Skeleton `fishead` header that
//! records the stream duration. It is metadata only; players that do not
//! recognise it ignore it, and it is not a conformant Skeleton stream.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Size of the hint packet.
pub const DURATION_HINT_SIZE: usize = 80;

/// Identifier at the start of the packet.
pub const FISHEAD_MAGIC: &[u8; 8] = b"fishead\0";

/// Builds a duration hint.
///
/// The presentation time is stored as microseconds over 1,000,000, both
/// 32-bit little-endian, so durations beyond about 71 minutes wrap.
pub fn duration_hint(duration: Duration, utc_seconds: u32) -> [u8; DURATION_HINT_SIZE] {
    let mut b = [0u8; DURATION_HINT_SIZE];
    b[..8].copy_from_slice(FISHEAD_MAGIC);
    b[8..10].copy_from_slice(&1u16.to_le_bytes()); // version major
    b[10..12].copy_from_slice(&0u16.to_le_bytes()); // version minor
    b[12..16].copy_from_slice(&(duration.as_micros() as u32).to_le_bytes());
    b[20..24].copy_from_slice(&1_000_000u32.to_le_bytes());
    b[44..48].copy_from_slice(&utc_seconds.to_le_bytes());
    b
}

/// Seconds since the Unix epoch, truncated to 32 bits.
pub fn now_utc_seconds() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_hint_layout() {
        let b = duration_hint(Duration::from_millis(2500), 0x6000_0001);
        assert_eq!(&b[..8], b"fishead\0");
        assert_eq!(&b[8..12], &[1, 0, 0, 0]);
        assert_eq!(u32::from_le_bytes([b[12], b[13], b[14], b[15]]), 2_500_000);
        assert_eq!(&b[16..20], &[0; 4]);
        assert_eq!(u32::from_le_bytes([b[20], b[21], b[22], b[23]]), 1_000_000);
        assert_eq!(&b[24..44], &[0; 20]);
        assert_eq!(&b[44..48], &[0x01, 0, 0, 0x60]);
        assert!(b[48..].iter().all(|&x| x == 0));
    }

    #[test]
    fn test_now_is_after_2020() {
        assert!(now_utc_seconds() > 1_577_836_800);
    }
}
