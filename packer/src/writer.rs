//! PCM to Ogg Opus pipeline.

use bytes::Bytes;
use tracing::trace;

use crate::codec::opus::OpusCodec;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::granule::SampleCount;
use crate::packer::Packer;
use crate::pcm::{FrameSegmenter, samples_from_le_bytes};

/// Feeds PCM through segmenter, codec and packer.
///
/// ```
/// use ogg_opus_packer::{BufferWriter, Config};
/// use ogg_opus_packer::codec::opus::TocProbe;
///
/// // TocProbe only decodes, so pre-encoded packets are fed here.
/// let config = Config::new(48000, 1).with_serial(1);
/// let mut writer = BufferWriter::new(&config, TocProbe::from_config(&config)).unwrap();
/// writer.send_opus_packet(&[0xF8, 0xFF, 0xFE]).unwrap();
/// let ogg = writer.finish().unwrap();
/// assert_eq!(&ogg[..4], b"OggS");
/// ```
pub struct BufferWriter<C: OpusCodec> {
    segmenter: FrameSegmenter,
    packer: Packer<C>,
    channels: usize,
    pending_byte: Option<u8>,
}

impl<C: OpusCodec> BufferWriter<C> {
    /// Creates a writer. The codec frame size must match the configuration.
    pub fn new(config: &Config, codec: C) -> Result<Self> {
        let segmenter = FrameSegmenter::new(config)?;
        if codec.frame_size() != segmenter.frame_size() {
            return Err(Error::InvalidConfiguration(format!(
                "codec frame size {} does not match configured {}",
                codec.frame_size(),
                segmenter.frame_size()
            )));
        }
        Ok(Self {
            segmenter,
            packer: Packer::new(config, codec)?,
            channels: config.channel_count as usize,
            pending_byte: None,
        })
    }

    /// Buffers interleaved samples and encodes every complete frame.
    ///
    /// Returns the number of packets added.
    pub fn send_pcm_chunk(&mut self, samples: &[i16]) -> Result<usize> {
        let segmented = self.segmenter.push(samples);
        let count = segmented.frames.len();
        for frame in segmented.frames {
            self.encode_frame(&frame, false)?;
        }
        Ok(count)
    }

    /// Like [`send_pcm_chunk`](Self::send_pcm_chunk) for little-endian
    /// bytes. An odd trailing byte is kept for the next call.
    pub fn send_pcm_bytes(&mut self, data: &[u8]) -> Result<usize> {
        let mut joined;
        let mut data = data;
        if let Some(first) = self.pending_byte.take() {
            joined = Vec::with_capacity(data.len() + 1);
            joined.push(first);
            joined.extend_from_slice(data);
            data = &joined;
        }
        if data.len() % 2 == 1 {
            self.pending_byte = data.last().copied();
        }
        let samples = samples_from_le_bytes(data);
        self.send_pcm_chunk(&samples)
    }

    /// Adds a packet encoded elsewhere. Its length is found by decoding.
    pub fn send_opus_packet(&mut self, packet: &[u8]) -> Result<()> {
        self.packer.add_chunk(packet, false, SampleCount::Unknown)
    }

    /// Takes the pages completed so far.
    pub fn read_pages(&mut self) -> Result<Bytes> {
        self.packer.read_pages()
    }

    /// Encodes the padded remainder, ends the stream and returns every
    /// page not read yet.
    pub fn finish(&mut self) -> Result<Bytes> {
        if self.pending_byte.take().is_some() {
            trace!("dropping odd trailing pcm byte");
        }
        if let Some(frame) = self.segmenter.flush_with_padding()? {
            self.encode_frame(&frame, true)?;
        }
        self.packer.close()?;
        self.packer.read_pages()
    }

    /// Returns the packer.
    pub fn packer(&self) -> &Packer<C> {
        &self.packer
    }

    fn encode_frame(&mut self, frame: &[i16], eos: bool) -> Result<()> {
        let packet = self.packer.codec_mut().encode(frame)?;
        let per_channel = frame.len() / self.channels;
        self.packer.add_chunk(&packet, eos, SampleCount::PerChannel(per_channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ogg::read_pages;
    use crate::codec::opus::FrameDuration;
    use crate::codec::opus::testing::StubCodec;

    fn config() -> Config {
        Config::new(16000, 1)
            .with_frame_duration(FrameDuration::Duration20ms)
            .with_serial(3)
    }

    #[test]
    fn test_frame_size_must_match() {
        assert!(matches!(
            BufferWriter::new(&config(), StubCodec::new(1, 960, 10)),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_chunks_and_padding() {
        let mut writer = BufferWriter::new(&config(), StubCodec::new(1, 320, 12)).unwrap();
        assert_eq!(writer.send_pcm_chunk(&[1; 500]).unwrap(), 1);
        assert_eq!(writer.send_pcm_chunk(&[1; 500]).unwrap(), 2);
        let out = writer.finish().unwrap();

        let pages = read_pages(&out).unwrap();
        let last = pages.last().unwrap();
        assert!(last.is_eos());
        // 1000 samples pad to four frames of 320
        assert_eq!(last.granule_position, 1280);
        assert_eq!(writer.packer().muxer().packets_written(), 6);
    }

    #[test]
    fn test_no_remainder_still_ends_stream() {
        let mut writer = BufferWriter::new(&config(), StubCodec::new(1, 320, 12)).unwrap();
        writer.send_pcm_chunk(&[0; 640]).unwrap();
        let out = writer.finish().unwrap();
        let pages = read_pages(&out).unwrap();
        assert!(pages.last().unwrap().is_eos());
        assert_eq!(pages.last().unwrap().granule_position, 640);
        assert_eq!(pages.iter().filter(|p| p.is_eos()).count(), 1);
    }

    #[test]
    fn test_pcm_bytes_carry_odd_byte() {
        let mut writer = BufferWriter::new(&config(), StubCodec::new(1, 320, 12)).unwrap();
        let bytes = vec![0u8; 1280];
        assert_eq!(writer.send_pcm_bytes(&bytes[..641]).unwrap(), 1);
        assert_eq!(writer.pending_byte, Some(0));
        assert_eq!(writer.send_pcm_bytes(&bytes[641..]).unwrap(), 1);
        assert_eq!(writer.segmenter.remainder_len(), 0);
        assert!(writer.pending_byte.is_none());
    }

    #[test]
    fn test_stereo_granule_counts_per_channel() {
        let config = Config::new(48000, 2)
            .with_frame_duration(FrameDuration::Duration10ms)
            .with_serial(4);
        let mut writer = BufferWriter::new(&config, StubCodec::new(2, 960, 8)).unwrap();
        writer.send_pcm_chunk(&[0; 960 * 3]).unwrap();
        let out = writer.finish().unwrap();
        let pages = read_pages(&out).unwrap();
        assert_eq!(pages.last().unwrap().granule_position, 1440);
    }

    #[test]
    fn test_encode_failure_surfaces() {
        let mut writer = BufferWriter::new(&config(), StubCodec::new(1, 320, 12)).unwrap();
        writer.packer.codec_mut().closed = true;
        assert!(matches!(
            writer.send_pcm_chunk(&[0; 320]),
            Err(Error::CodecFailure(_))
        ));
    }
}
