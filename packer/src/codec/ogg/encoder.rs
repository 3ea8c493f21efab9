//! Ogg encoder/writer.
//!
//! Assembles packets into pages. Packets accumulate on the page under
//! construction until its segment table is full or a flush is forced;
//! a packet that does not fit is split and continues on the next page.

use std::io::Write;

use tracing::trace;

use super::page::{MAX_SEGMENTS, PAGE_HEADER_SIZE, Page, flags, lacing_values};
use super::stream::StreamState;
use crate::error::{Error, Result};

/// Ogg encoder for writing a single logical stream.
pub struct OggEncoder<W: Write> {
    writer: W,
    state: StreamState,
    segment_table: Vec<u8>,
    body: Vec<u8>,
    header_type: u8,
    page_granule: i64,
    pages_written: u64,
}

impl<W: Write> OggEncoder<W> {
    /// Creates a new Ogg encoder.
    pub fn new(writer: W, serial: u32) -> Self {
        Self {
            writer,
            state: StreamState::new(serial),
            segment_table: Vec::with_capacity(MAX_SEGMENTS),
            body: Vec::new(),
            header_type: 0,
            page_granule: -1,
            pages_written: 0,
        }
    }

    /// Returns the stream state.
    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Returns the number of pages written so far.
    pub fn pages_written(&self) -> u64 {
        self.pages_written
    }

    /// Returns the serialized size of the page under construction, or
    /// zero when it holds no segment.
    pub fn pending_bytes(&self) -> usize {
        if self.segment_table.is_empty() {
            return 0;
        }
        PAGE_HEADER_SIZE + self.segment_table.len() + self.body.len()
    }

    /// Writes a packet to the stream and returns its packet number.
    ///
    /// `granule_increment` is added to the running granule position. The
    /// first packet of the stream must set `is_bos`; the packet setting
    /// `is_eos` is the last one accepted and flushes its page.
    pub fn write_packet(
        &mut self,
        data: &[u8],
        granule_increment: u64,
        is_bos: bool,
        is_eos: bool,
    ) -> Result<u64> {
        if self.state.eos_seen() {
            return Err(Error::illegal("ended", "write a packet"));
        }
        if is_bos && self.state.bos_seen() {
            return Err(Error::illegal("open", "mark a second packet as first"));
        }
        if !is_bos && !self.state.bos_seen() {
            return Err(Error::illegal("uninitialized", "write a packet before the first packet"));
        }

        let packet_no = self.state.next_packet_no();
        let granule = self.state.advance_granule(granule_increment);
        if is_bos {
            self.state.mark_bos();
        }

        let lacing = lacing_values(data.len());
        let mut offset = 0;
        for (i, &lace) in lacing.iter().enumerate() {
            if self.segment_table.len() == MAX_SEGMENTS {
                self.emit_page(0)?;
                if i > 0 {
                    self.header_type |= flags::CONTINUATION;
                }
            }
            if i == 0 && is_bos {
                self.header_type |= flags::BOS;
            }
            let end = offset + lace as usize;
            self.segment_table.push(lace);
            self.body.extend_from_slice(&data[offset..end]);
            offset = end;
        }
        self.page_granule = granule;

        trace!(
            "ogg: packet {} ({} bytes, {} segments) granule={}",
            packet_no,
            data.len(),
            lacing.len(),
            granule
        );

        if is_eos {
            self.state.mark_eos();
            self.emit_page(flags::EOS)?;
        }
        Ok(packet_no)
    }

    /// Closes the page under construction if it holds any segment.
    ///
    /// Returns true if a page was written.
    pub fn flush(&mut self) -> Result<bool> {
        if self.segment_table.is_empty() {
            return Ok(false);
        }
        self.emit_page(0)?;
        Ok(true)
    }

    /// Ends the stream.
    ///
    /// The pending page is written with the end-of-stream flag. When
    /// nothing is pending an empty end-of-stream page is written instead,
    /// unless an end-of-stream page already went out.
    pub fn finish(&mut self) -> Result<bool> {
        if self.state.eos_seen() && self.segment_table.is_empty() {
            return Ok(false);
        }
        self.state.mark_eos();
        if self.segment_table.is_empty() {
            self.page_granule = self.state.granule_position();
            if self.pages_written == 0 {
                self.header_type |= flags::BOS;
            }
        }
        self.emit_page(flags::EOS)?;
        Ok(true)
    }

    fn emit_page(&mut self, extra_flags: u8) -> Result<()> {
        debug_assert!(self.segment_table.len() <= MAX_SEGMENTS);

        let mut page = Page {
            version: 0,
            header_type: self.header_type | extra_flags,
            granule_position: self.page_granule,
            serial: self.state.serial(),
            sequence: self.state.next_sequence(),
            checksum: 0,
            segments: self.segment_table.len() as u8,
            segment_table: std::mem::take(&mut self.segment_table),
            body: std::mem::take(&mut self.body),
        };
        let bytes = page.to_bytes();
        self.writer.write_all(&bytes)?;

        trace!(
            "ogg: page {} flags={:#04x} granule={} segments={} size={}",
            page.sequence,
            page.header_type,
            page.granule_position,
            page.segments,
            bytes.len()
        );

        self.pages_written += 1;
        self.header_type = 0;
        self.page_granule = -1;
        self.segment_table = page.segment_table;
        self.segment_table.clear();
        Ok(())
    }

    /// Returns a reference to the inner writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Returns a mutable reference to the inner writer.
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
