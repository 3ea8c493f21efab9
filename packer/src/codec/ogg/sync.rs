//! Ogg sync/decoder for reading Ogg streams back.
//!
//! Used to inspect and verify produced streams: every page checksum is
//! checked, and [`PacketReader`] joins packets that span pages.

use std::io::{self, Read};

use super::packet::Packet;
use super::page::{CAPTURE_PATTERN, MAX_SEGMENT_SIZE, PAGE_HEADER_SIZE, Page};
use crate::error::{Error, Result};

/// Ogg sync state for reading pages.
pub struct OggSync<R: Read> {
    reader: R,
}

impl<R: Read> OggSync<R> {
    /// Creates a new Ogg sync state.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the next Ogg page, or `None` at a clean end of input.
    pub fn read_page(&mut self) -> Result<Option<Page>> {
        let mut header = [0u8; PAGE_HEADER_SIZE];
        match self.reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        if &header[0..4] != CAPTURE_PATTERN {
            return Err(Error::InvalidPage("invalid Ogg magic".into()));
        }

        let segments = header[26];
        let mut segment_table = vec![0u8; segments as usize];
        self.reader.read_exact(&mut segment_table)?;

        let body_size: usize = segment_table.iter().map(|&s| s as usize).sum();
        let mut body = vec![0u8; body_size];
        self.reader.read_exact(&mut body)?;

        let mut data = Vec::with_capacity(PAGE_HEADER_SIZE + segment_table.len() + body_size);
        data.extend_from_slice(&header);
        data.extend_from_slice(&segment_table);
        data.extend_from_slice(&body);
        let (page, _) = Page::parse(&data)?;
        Ok(Some(page))
    }

    /// Returns the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Parses every page in `data`, verifying checksums.
pub fn read_pages(data: &[u8]) -> Result<Vec<Page>> {
    let mut pages = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let (page, used) = Page::parse(&data[pos..])?;
        pages.push(page);
        pos += used;
    }
    Ok(pages)
}

/// Reassembles packets from a sequence of pages.
pub struct PacketReader<R: Read> {
    sync: OggSync<R>,
    partial: Vec<u8>,
    in_packet: bool,
    next_packet_no: u64,
    bos_pending: bool,
    pending: std::collections::VecDeque<Packet>,
    done: bool,
}

impl<R: Read> PacketReader<R> {
    /// Creates a packet reader over raw stream bytes.
    pub fn new(reader: R) -> Self {
        Self {
            sync: OggSync::new(reader),
            partial: Vec::new(),
            in_packet: false,
            next_packet_no: 1,
            bos_pending: false,
            pending: std::collections::VecDeque::new(),
            done: false,
        }
    }

    /// Reads the next complete packet, or `None` at end of stream.
    pub fn read_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            if let Some(packet) = self.pending.pop_front() {
                return Ok(Some(packet));
            }
            if self.done {
                return Ok(None);
            }
            match self.sync.read_page()? {
                Some(page) => self.split_page(&page)?,
                None => {
                    self.done = true;
                    if self.in_packet {
                        return Err(Error::InvalidPage("stream ends inside a packet".into()));
                    }
                }
            }
        }
    }

    fn split_page(&mut self, page: &Page) -> Result<()> {
        if page.is_continuation() != self.in_packet {
            return Err(Error::InvalidPage(format!(
                "page {} continuation flag does not match packet state",
                page.sequence
            )));
        }
        if page.is_bos() {
            self.bos_pending = true;
        }

        let completed = page.packets_completed();
        let mut ended = 0;
        let mut offset = 0;
        for &lace in &page.segment_table {
            let end = offset + lace as usize;
            self.partial.extend_from_slice(&page.body[offset..end]);
            offset = end;
            if (lace as usize) < MAX_SEGMENT_SIZE {
                ended += 1;
                let is_last_on_page = ended == completed;
                let packet = Packet {
                    data: std::mem::take(&mut self.partial),
                    packet_no: self.next_packet_no,
                    granule_position: if is_last_on_page {
                        page.granule_position
                    } else {
                        -1
                    },
                    is_first_in_stream: std::mem::take(&mut self.bos_pending),
                    is_last_in_stream: is_last_on_page && page.is_eos() && !page.ends_mid_packet(),
                };
                self.next_packet_no += 1;
                self.pending.push_back(packet);
            }
        }
        self.in_packet = page.ends_mid_packet();
        if page.is_eos() {
            self.done = true;
        }
        Ok(())
    }
}

impl<R: Read> Iterator for PacketReader<R> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_packet() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                self.pending.clear();
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ogg::encoder::OggEncoder;
    use std::io::Cursor;

    fn create_test_ogg_data() -> Vec<u8> {
        let mut encoder = OggEncoder::new(Vec::new(), 12345);
        let packet = vec![0u8; 100];
        encoder.write_packet(&packet, 0, true, false).unwrap();
        encoder.flush().unwrap();
        encoder.write_packet(&packet, 960, false, false).unwrap();
        encoder.flush().unwrap();
        encoder.write_packet(&packet, 960, false, true).unwrap();
        encoder.into_inner()
    }

    #[test]
    fn test_ogg_sync_read_multiple_pages() {
        let data = create_test_ogg_data();
        let mut sync = OggSync::new(Cursor::new(data));

        let mut count = 0;
        let mut found_bos = false;
        let mut found_eos = false;
        while let Some(page) = sync.read_page().unwrap() {
            count += 1;
            found_bos |= page.is_bos();
            found_eos |= page.is_eos();
        }

        assert_eq!(count, 3);
        assert!(found_bos);
        assert!(found_eos);
    }

    #[test]
    fn test_ogg_sync_empty_input() {
        let mut sync = OggSync::new(Cursor::new(Vec::<u8>::new()));
        assert!(sync.read_page().unwrap().is_none());
    }

    #[test]
    fn test_ogg_sync_invalid_magic() {
        let mut sync = OggSync::new(Cursor::new(vec![0u8; 100]));
        assert!(matches!(sync.read_page(), Err(Error::InvalidPage(_))));
    }

    #[test]
    fn test_ogg_sync_detects_corruption() {
        let mut data = create_test_ogg_data();
        data[40] ^= 0x10;
        let mut sync = OggSync::new(Cursor::new(data));
        assert!(matches!(sync.read_page(), Err(Error::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_ogg_sync_into_inner() {
        let data = create_test_ogg_data();
        let sync = OggSync::new(Cursor::new(data.clone()));
        assert_eq!(sync.into_inner().into_inner(), data);
    }

    #[test]
    fn test_read_pages_slice() {
        let data = create_test_ogg_data();
        let pages = read_pages(&data).unwrap();
        let sequences: Vec<u32> = pages.iter().map(|p| p.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
        assert!(read_pages(&data[..data.len() - 3]).is_err());
    }

    #[test]
    fn test_packet_reader_roundtrip() {
        let mut encoder = OggEncoder::new(Vec::new(), 54321);
        let big: Vec<u8> = (0..70_000).map(|i| (i % 241) as u8).collect();
        encoder.write_packet(b"Hello, Ogg world!", 0, true, false).unwrap();
        encoder.write_packet(&big, 960, false, false).unwrap();
        encoder.write_packet(&[7u8; 510], 960, false, true).unwrap();

        let packets: Vec<Packet> = PacketReader::new(Cursor::new(encoder.into_inner()))
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0].data, b"Hello, Ogg world!");
        assert!(packets[0].is_first_in_stream);
        assert_eq!(packets[1].data, big);
        assert_eq!(packets[1].packet_no, 2);
        assert_eq!(packets[2].len(), 510);
        assert!(packets[2].is_last_in_stream);
        assert_eq!(packets[2].granule_position, 1920);
    }

    #[test]
    fn test_packet_reader_rejects_dangling_continuation() {
        let mut encoder = OggEncoder::new(Vec::new(), 1);
        encoder.write_packet(&[0u8; 10], 0, true, false).unwrap();
        encoder.flush().unwrap();
        encoder.write_packet(&vec![0u8; 70_000], 0, false, true).unwrap();
        let data = encoder.into_inner();

        // drop the last page
        let pages = read_pages(&data).unwrap();
        let keep: usize = pages[..pages.len() - 1].iter().map(|p| p.size()).sum();
        let mut reader = PacketReader::new(Cursor::new(data[..keep].to_vec()));
        assert!(reader.read_packet().unwrap().is_some());
        assert!(reader.read_packet().is_err());
    }
}
