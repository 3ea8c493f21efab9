//! Ogg Opus stream muxer.
//!
//! Owns one logical stream. Construction writes the `OpusHead` and
//! `OpusTags` header pages; audio packets follow through
//! [`OggOpusMuxer::add_packet`], and [`OggOpusMuxer::close`] ends the
//! stream. Completed pages collect in a [`PageSink`] until read.

use bytes::Bytes;
use tracing::debug;

use super::encoder::OggEncoder;
use crate::codec::opus::{OpusHead, OpusTags};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::sink::PageSink;

/// Lifecycle of a muxer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxerState {
    /// Header packets not written yet.
    Uninitialized,
    /// Accepting audio packets.
    StreamOpen,
    /// Last packet written; only flushing, reading and closing remain.
    Ended,
    /// End of stream written.
    Closed,
}

impl MuxerState {
    /// Returns a lowercase name for messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::StreamOpen => "stream_open",
            Self::Ended => "ended",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for MuxerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Muxes Opus packets into an Ogg logical bitstream.
pub struct OggOpusMuxer {
    state: MuxerState,
    encoder: OggEncoder<PageSink>,
    head: OpusHead,
}

impl OggOpusMuxer {
    /// Creates a muxer and writes the header pages.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let serial = config.resolve_serial();
        let mut muxer = Self {
            state: MuxerState::Uninitialized,
            encoder: OggEncoder::new(PageSink::with_capacity(4096), serial),
            head: OpusHead::from_config(config),
        };
        muxer.write_headers(&OpusTags::from_config(config))?;
        Ok(muxer)
    }

    fn write_headers(&mut self, tags: &OpusTags) -> Result<()> {
        // Each header packet sits alone on its page.
        self.encoder.write_packet(&self.head.to_bytes(), 0, true, false)?;
        self.encoder.flush()?;
        self.encoder.write_packet(&tags.to_bytes(), 0, false, false)?;
        self.encoder.flush()?;
        self.state = MuxerState::StreamOpen;

        debug!(
            "ogg opus stream {:#010x} opened: {} Hz, {} channel(s)",
            self.serial(),
            self.head.sample_rate,
            self.head.channels
        );
        Ok(())
    }

    /// Appends an audio packet.
    ///
    /// `granule_delta` is the number of samples per channel the packet
    /// decodes to. `is_last` marks the final packet, flushes its page
    /// with the end-of-stream flag and moves the muxer to
    /// [`MuxerState::Ended`]. Returns the packet number.
    pub fn add_packet(&mut self, payload: &[u8], granule_delta: u64, is_last: bool) -> Result<u64> {
        if self.state != MuxerState::StreamOpen {
            return Err(Error::illegal(self.state.as_str(), "add packet"));
        }
        let packet_no = self.encoder.write_packet(payload, granule_delta, false, is_last)?;
        if is_last {
            self.state = MuxerState::Ended;
        }
        Ok(packet_no)
    }

    /// Closes the page under construction, if any.
    pub fn flush(&mut self) -> Result<()> {
        if self.state == MuxerState::StreamOpen {
            self.encoder.flush()?;
        }
        Ok(())
    }

    /// Takes all completed pages since the last read.
    ///
    /// Fails with [`Error::EmptyOutput`] when no page has completed;
    /// that condition is not fatal.
    pub fn read_pages(&mut self) -> Result<Bytes> {
        self.encoder.writer_mut().drain().ok_or(Error::EmptyOutput)
    }

    /// Ends the stream.
    ///
    /// Pending audio goes out on a final page with the end-of-stream flag.
    /// Calling it again does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.state == MuxerState::Closed {
            return Ok(());
        }
        self.encoder.finish()?;
        self.state = MuxerState::Closed;

        debug!(
            "ogg opus stream {:#010x} closed: {} packets, {} pages, granule {}",
            self.serial(),
            self.packets_written(),
            self.pages_written(),
            self.granule_position()
        );
        Ok(())
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> MuxerState {
        self.state
    }

    /// Returns the stream serial number.
    pub fn serial(&self) -> u32 {
        self.encoder.state().serial()
    }

    /// Returns the identification header written for this stream.
    pub fn head(&self) -> &OpusHead {
        &self.head
    }

    /// Returns the granule position after the last added packet.
    pub fn granule_position(&self) -> i64 {
        self.encoder.state().granule_position()
    }

    /// Returns the number of packets written, headers included.
    pub fn packets_written(&self) -> u64 {
        self.encoder.state().packet_no() - 1
    }

    /// Returns the number of pages completed.
    pub fn pages_written(&self) -> u64 {
        self.encoder.pages_written()
    }

    /// Returns the size of the page under construction.
    pub fn pending_bytes(&self) -> usize {
        self.encoder.pending_bytes()
    }

    /// Returns the number of completed bytes not read yet.
    pub fn buffered_bytes(&self) -> usize {
        self.encoder.writer().len()
    }
}
