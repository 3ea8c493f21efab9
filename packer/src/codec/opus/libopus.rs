//! libopus-backed codec (feature `libopus`).

use super::codec::{DecodedFrame, MAX_FRAME_SAMPLES, MAX_PACKET_SIZE, OpusCodec, check_frame};
use crate::config::Config;
use crate::error::{Error, Result};

/// Opus application type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Application {
    /// Best quality for voice signals.
    VoIP,
    /// Best quality for non-voice signals.
    #[default]
    Audio,
    /// Minimum possible coding delay.
    RestrictedLowdelay,
}

impl Application {
    fn to_opus(self) -> opus::Application {
        match self {
            Self::VoIP => opus::Application::Voip,
            Self::Audio => opus::Application::Audio,
            Self::RestrictedLowdelay => opus::Application::LowDelay,
        }
    }
}

struct Handles {
    encoder: opus::Encoder,
    decoder: opus::Decoder,
}

/// Encoder and decoder pair from libopus.
pub struct LibOpusCodec {
    channels: u8,
    frame_size: usize,
    handles: Option<Handles>,
}

impl LibOpusCodec {
    /// Creates a codec for the configured stream.
    pub fn new(config: &Config, application: Application) -> Result<Self> {
        config.validate()?;
        let channels = match config.channel_count {
            1 => opus::Channels::Mono,
            _ => opus::Channels::Stereo,
        };
        let encoder = opus::Encoder::new(config.sample_rate, channels, application.to_opus())
            .map_err(|e| Error::CodecFailure(format!("encoder create failed: {}", e)))?;
        let decoder = opus::Decoder::new(config.sample_rate, channels)
            .map_err(|e| Error::CodecFailure(format!("decoder create failed: {}", e)))?;

        Ok(Self {
            channels: config.channel_count,
            frame_size: config.frame_size_samples(),
            handles: Some(Handles { encoder, decoder }),
        })
    }

    /// Sets the target bitrate in bits per second.
    pub fn set_bitrate(&mut self, bitrate: i32) -> Result<()> {
        let handles = self.handles()?;
        handles
            .encoder
            .set_bitrate(opus::Bitrate::Bits(bitrate))
            .map_err(|e| Error::CodecFailure(format!("set bitrate failed: {}", e)))
    }

    fn handles(&mut self) -> Result<&mut Handles> {
        self.handles
            .as_mut()
            .ok_or_else(|| Error::CodecFailure("opus codec is closed".into()))
    }
}

impl OpusCodec for LibOpusCodec {
    fn channels(&self) -> u8 {
        self.channels
    }

    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn encode(&mut self, frame: &[i16]) -> Result<Vec<u8>> {
        check_frame(frame, self.frame_size)?;
        let handles = self.handles()?;
        handles
            .encoder
            .encode_vec(frame, MAX_PACKET_SIZE)
            .map_err(|e| Error::CodecFailure(format!("encode failed: {}", e)))
    }

    fn decode(&mut self, packet: &[u8]) -> Result<DecodedFrame> {
        let channels = self.channels as usize;
        let handles = self.handles()?;
        let mut pcm = vec![0i16; MAX_FRAME_SAMPLES * channels];
        let samples_per_channel = handles
            .decoder
            .decode(packet, &mut pcm, false)
            .map_err(|e| Error::CodecFailure(format!("decode failed: {}", e)))?;
        pcm.truncate(samples_per_channel * channels);
        Ok(DecodedFrame {
            pcm,
            samples_per_channel,
        })
    }

    fn close(&mut self) {
        self.handles = None;
    }
}
