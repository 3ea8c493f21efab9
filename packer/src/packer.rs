//! Packer: Opus packets in, Ogg pages out.

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::codec::ogg::{MuxerState, OggOpusMuxer};
use crate::codec::opus::OpusCodec;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::granule::{GranuleAccountant, SampleCount};
use crate::skeleton;

/// Packs Opus packets into an Ogg Opus stream.
///
/// The codec is used to learn the length of packets whose sample count
/// the caller does not know, and is released on [`Packer::close`].
/// Dropping an open packer closes it.
pub struct Packer<C: OpusCodec> {
    muxer: OggOpusMuxer,
    accountant: GranuleAccountant,
    codec: C,
    sample_rate: u32,
}

impl<C: OpusCodec> Packer<C> {
    /// Creates a packer and writes the stream headers.
    pub fn new(config: &Config, codec: C) -> Result<Self> {
        config.validate()?;
        if codec.channels() != config.channel_count {
            return Err(Error::InvalidConfiguration(format!(
                "codec has {} channel(s), stream has {}",
                codec.channels(),
                config.channel_count
            )));
        }
        Ok(Self {
            muxer: OggOpusMuxer::new(config)?,
            accountant: GranuleAccountant::new(config.channel_count),
            codec,
            sample_rate: config.sample_rate,
        })
    }

    /// Adds one Opus packet.
    ///
    /// `eos` marks the last packet; its page is written with the
    /// end-of-stream flag.
    pub fn add_chunk(&mut self, data: &[u8], eos: bool, samples: SampleCount) -> Result<()> {
        self.ensure_open("add chunk")?;
        let delta = self.accountant.measure(&mut self.codec, data, samples)?;
        self.muxer.add_packet(data, delta, eos)?;
        self.accountant.commit(delta);
        Ok(())
    }

    /// Adds a duration hint packet for `duration`.
    pub fn add_skeleton(&mut self, duration: Duration) -> Result<()> {
        self.ensure_open("add skeleton")?;
        let hint = skeleton::duration_hint(duration, skeleton::now_utc_seconds());
        self.muxer.add_packet(&hint, 0, false)?;
        Ok(())
    }

    /// Returns the duration of the audio added so far.
    pub fn duration(&self) -> Duration {
        let micros = self.accountant.total() * 1_000_000 / self.sample_rate as u64;
        Duration::from_micros(micros)
    }

    /// Takes the pages completed since the last read.
    pub fn read_pages(&mut self) -> Result<Bytes> {
        self.muxer.read_pages()
    }

    /// Closes the page under construction.
    pub fn flush(&mut self) -> Result<()> {
        self.muxer.flush()
    }

    /// Ends the stream and releases the codec. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        if self.muxer.state() == MuxerState::Closed {
            return Ok(());
        }
        let result = self.muxer.close();
        self.codec.close();
        result
    }

    /// Returns the codec.
    pub fn codec_mut(&mut self) -> &mut C {
        &mut self.codec
    }

    /// Returns the underlying muxer.
    pub fn muxer(&self) -> &OggOpusMuxer {
        &self.muxer
    }

    fn ensure_open(&self, operation: &'static str) -> Result<()> {
        match self.muxer.state() {
            MuxerState::StreamOpen => Ok(()),
            state => Err(Error::illegal(state.as_str(), operation)),
        }
    }
}

impl<C: OpusCodec> Drop for Packer<C> {
    fn drop(&mut self) {
        if self.muxer.state() == MuxerState::Closed {
            return;
        }
        warn!("packer for stream {:#010x} dropped while open", self.muxer.serial());
        match self.close() {
            Ok(()) => debug!("stream {:#010x} closed on drop", self.muxer.serial()),
            Err(e) => warn!("closing stream {:#010x} on drop: {}", self.muxer.serial(), e),
        }
    }
}
