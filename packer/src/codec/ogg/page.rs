//! Ogg page structures.

use super::crc::crc32;
use crate::error::{Error, Result};

/// Capture pattern at the start of every page.
pub const CAPTURE_PATTERN: &[u8; 4] = b"OggS";

/// Size of the fixed page header.
pub const PAGE_HEADER_SIZE: usize = 27;

/// Maximum number of lacing values in a segment table.
pub const MAX_SEGMENTS: usize = 255;

/// Maximum size of one segment.
pub const MAX_SEGMENT_SIZE: usize = 255;

/// Largest possible page: header, full segment table and full body.
pub const MAX_PAGE_SIZE: usize =
    PAGE_HEADER_SIZE + MAX_SEGMENTS + MAX_SEGMENTS * MAX_SEGMENT_SIZE;

/// Offset of the checksum field in the page header.
const CHECKSUM_OFFSET: usize = 22;

/// Ogg page header.
#[derive(Debug, Clone)]
pub struct Page {
    /// Version (always 0)
    pub version: u8,
    /// Header type flags
    pub header_type: u8,
    /// Absolute granule position
    pub granule_position: i64,
    /// Stream serial number
    pub serial: u32,
    /// Page sequence number
    pub sequence: u32,
    /// CRC checksum
    pub checksum: u32,
    /// Number of segments
    pub segments: u8,
    /// Segment table
    pub segment_table: Vec<u8>,
    /// Page body data
    pub body: Vec<u8>,
}

impl Page {
    /// Creates a new empty page.
    pub fn new() -> Self {
        Self {
            version: 0,
            header_type: 0,
            granule_position: 0,
            serial: 0,
            sequence: 0,
            checksum: 0,
            segments: 0,
            segment_table: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Returns true if this is a beginning-of-stream page.
    pub fn is_bos(&self) -> bool {
        (self.header_type & flags::BOS) != 0
    }

    /// Returns true if this is an end-of-stream page.
    pub fn is_eos(&self) -> bool {
        (self.header_type & flags::EOS) != 0
    }

    /// Returns true if this page starts with the tail of a packet.
    pub fn is_continuation(&self) -> bool {
        (self.header_type & flags::CONTINUATION) != 0
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        PAGE_HEADER_SIZE + self.segment_table.len() + self.body.len()
    }

    /// Number of packets that end on this page.
    pub fn packets_completed(&self) -> usize {
        self.segment_table
            .iter()
            .filter(|&&lace| (lace as usize) < MAX_SEGMENT_SIZE)
            .count()
    }

    /// Returns true if the last packet on this page continues on the next one.
    pub fn ends_mid_packet(&self) -> bool {
        self.segment_table.last().is_some_and(|&lace| lace as usize == MAX_SEGMENT_SIZE)
    }

    /// Serializes the page and fills in its checksum.
    ///
    /// The checksum is computed over the whole page with the checksum
    /// field set to zero, then written into that field.
    pub fn to_bytes(&mut self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size());
        self.write_unchecked(&mut out);
        self.checksum = crc32(&out);
        out[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }

    fn write_unchecked(&self, out: &mut Vec<u8>) {
        // Capture pattern "OggS"
        out.extend_from_slice(CAPTURE_PATTERN);
        // Version
        out.push(self.version);
        // Header type
        out.push(self.header_type);
        // Granule position (little-endian)
        out.extend_from_slice(&self.granule_position.to_le_bytes());
        // Serial number
        out.extend_from_slice(&self.serial.to_le_bytes());
        // Sequence number
        out.extend_from_slice(&self.sequence.to_le_bytes());
        // CRC placeholder
        out.extend_from_slice(&[0u8; 4]);
        // Number of segments
        out.push(self.segments);
        // Segment table
        out.extend_from_slice(&self.segment_table);
        out.extend_from_slice(&self.body);
    }

    /// Parses one page from the front of `data`.
    ///
    /// Returns the page and the number of bytes it occupied. The checksum
    /// is verified.
    pub fn parse(data: &[u8]) -> Result<(Page, usize)> {
        if data.len() < PAGE_HEADER_SIZE {
            return Err(Error::InvalidPage(format!(
                "truncated header: {} bytes",
                data.len()
            )));
        }
        if &data[..4] != CAPTURE_PATTERN {
            return Err(Error::InvalidPage("invalid Ogg magic".into()));
        }

        let segments = data[26];
        let table_end = PAGE_HEADER_SIZE + segments as usize;
        if data.len() < table_end {
            return Err(Error::InvalidPage("truncated segment table".into()));
        }
        let segment_table = data[PAGE_HEADER_SIZE..table_end].to_vec();
        let body_size: usize = segment_table.iter().map(|&s| s as usize).sum();
        let page_end = table_end + body_size;
        if data.len() < page_end {
            return Err(Error::InvalidPage("truncated body".into()));
        }

        let page = Page {
            version: data[4],
            header_type: data[5],
            granule_position: i64::from_le_bytes(le_array(&data[6..14])),
            serial: u32::from_le_bytes(le_array(&data[14..18])),
            sequence: u32::from_le_bytes(le_array(&data[18..22])),
            checksum: u32::from_le_bytes(le_array(&data[22..26])),
            segments,
            segment_table,
            body: data[table_end..page_end].to_vec(),
        };
        page.verify_checksum()?;
        Ok((page, page_end))
    }

    /// Recomputes the checksum and compares it with the stored one.
    pub fn verify_checksum(&self) -> Result<()> {
        let mut out = Vec::with_capacity(self.size());
        self.write_unchecked(&mut out);
        let actual = crc32(&out);
        if actual != self.checksum {
            return Err(Error::ChecksumMismatch {
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

/// Header type flags.
pub mod flags {
    /// Continuation of previous packet.
    pub const CONTINUATION: u8 = 0x01;
    /// Beginning of stream.
    pub const BOS: u8 = 0x02;
    /// End of stream.
    pub const EOS: u8 = 0x04;
}

/// Lacing values for a packet of `len` bytes.
///
/// Full 255-byte segments followed by one terminating segment of
/// 0..=254 bytes. A length that is a multiple of 255 (including zero)
/// ends with an explicit zero-length segment.
pub fn lacing_values(len: usize) -> Vec<u8> {
    let mut table = vec![MAX_SEGMENT_SIZE as u8; len / MAX_SEGMENT_SIZE];
    table.push((len % MAX_SEGMENT_SIZE) as u8);
    table
}
