//! Opus TOC (Table of Contents) parsing.
//!
//! Implements RFC 6716 Section 3.1, enough to learn how many samples a
//! packet carries without running the decoder.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::codec::{DecodedFrame, OpusCodec};
use crate::error::{Error, Result};

/// Longest audio a single Opus packet may carry.
pub const MAX_PACKET_DURATION_MICROS: u32 = 120_000;

/// TOC byte from an Opus packet header.
///
/// Layout:
/// ```text
///          0 1 2 3 4 5 6 7
///         +-+-+-+-+-+-+-+-+
///         | config  |s| c |
///         +-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TOC(pub u8);

impl TOC {
    /// Creates a TOC from a byte.
    pub const fn new(byte: u8) -> Self {
        Self(byte)
    }

    /// Returns the configuration number (0-31).
    pub fn configuration(&self) -> u8 {
        self.0 >> 3
    }

    /// Returns true if the TOC indicates stereo audio.
    pub fn is_stereo(&self) -> bool {
        (self.0 & 0b00000100) != 0
    }

    /// Returns the frame code (number of frames per packet).
    pub fn frame_code(&self) -> FrameCode {
        FrameCode::from_bits(self.0 & 0b00000011)
    }

    /// Returns the duration of each frame in the packet.
    pub fn frame_duration(&self) -> FrameDuration {
        match self.configuration() {
            16 | 20 | 24 | 28 => FrameDuration::Duration2500us,
            17 | 21 | 25 | 29 => FrameDuration::Duration5ms,
            0 | 4 | 8 | 12 | 14 | 18 | 22 | 26 | 30 => FrameDuration::Duration10ms,
            1 | 5 | 9 | 13 | 15 | 19 | 23 | 27 | 31 => FrameDuration::Duration20ms,
            2 | 6 | 10 => FrameDuration::Duration40ms,
            _ => FrameDuration::Duration60ms,
        }
    }
}

impl std::fmt::Display for TOC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "opus_toc: config={}, stereo={}, {}, {}",
            self.configuration(),
            self.is_stereo(),
            self.frame_code(),
            self.frame_duration(),
        )
    }
}

/// Frame code indicating number of frames per packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCode {
    /// One frame in the packet.
    OneFrame,
    /// Two frames with equal compressed size.
    TwoEqualFrames,
    /// Two frames with different compressed sizes.
    TwoDifferentFrames,
    /// Arbitrary number of frames.
    ArbitraryFrames,
}

impl FrameCode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::OneFrame,
            1 => Self::TwoEqualFrames,
            2 => Self::TwoDifferentFrames,
            _ => Self::ArbitraryFrames,
        }
    }
}

impl std::fmt::Display for FrameCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneFrame => write!(f, "One Frame"),
            Self::TwoEqualFrames => write!(f, "Two Equal Frames"),
            Self::TwoDifferentFrames => write!(f, "Two Different Frames"),
            Self::ArbitraryFrames => write!(f, "Arbitrary Frames"),
        }
    }
}

/// Frame duration.
///
/// Serialized as milliseconds (`2.5`, `5`, `10`, `20`, `40`, `60`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum FrameDuration {
    Duration2500us,
    Duration5ms,
    Duration10ms,
    Duration20ms,
    Duration40ms,
    Duration60ms,
}

impl FrameDuration {
    /// Returns the duration in microseconds.
    pub fn micros(&self) -> u32 {
        match self {
            Self::Duration2500us => 2500,
            Self::Duration5ms => 5000,
            Self::Duration10ms => 10_000,
            Self::Duration20ms => 20_000,
            Self::Duration40ms => 40_000,
            Self::Duration60ms => 60_000,
        }
    }

    /// Returns the duration as a Duration.
    pub fn duration(&self) -> Duration {
        Duration::from_micros(self.micros() as u64)
    }

    /// Samples per channel covered by one frame at `sample_rate`.
    pub fn samples_at(&self, sample_rate: u32) -> usize {
        (self.micros() as u64 * sample_rate as u64 / 1_000_000) as usize
    }
}

impl std::fmt::Display for FrameDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duration2500us => write!(f, "2.5ms"),
            Self::Duration5ms => write!(f, "5ms"),
            Self::Duration10ms => write!(f, "10ms"),
            Self::Duration20ms => write!(f, "20ms"),
            Self::Duration40ms => write!(f, "40ms"),
            Self::Duration60ms => write!(f, "60ms"),
        }
    }
}

impl TryFrom<f64> for FrameDuration {
    type Error = String;

    fn try_from(ms: f64) -> std::result::Result<Self, Self::Error> {
        let micros = (ms * 1000.0).round() as i64;
        match micros {
            2500 => Ok(Self::Duration2500us),
            5000 => Ok(Self::Duration5ms),
            10_000 => Ok(Self::Duration10ms),
            20_000 => Ok(Self::Duration20ms),
            40_000 => Ok(Self::Duration40ms),
            60_000 => Ok(Self::Duration60ms),
            _ => Err(format!(
                "unsupported frame duration {}ms (expected 2.5, 5, 10, 20, 40 or 60)",
                ms
            )),
        }
    }
}

impl From<FrameDuration> for f64 {
    fn from(fd: FrameDuration) -> f64 {
        fd.micros() as f64 / 1000.0
    }
}

/// Number of frames in a packet, from its TOC and (for code 3) count byte.
pub fn frame_count(packet: &[u8]) -> Result<usize> {
    let toc = packet
        .first()
        .map(|&b| TOC::new(b))
        .ok_or_else(|| Error::CodecFailure("empty opus packet".into()))?;

    match toc.frame_code() {
        FrameCode::OneFrame => Ok(1),
        FrameCode::TwoEqualFrames | FrameCode::TwoDifferentFrames => Ok(2),
        FrameCode::ArbitraryFrames => {
            let count = packet.get(1).map(|&b| (b & 0b00111111) as usize).ok_or_else(|| {
                Error::CodecFailure("code 3 opus packet without frame count byte".into())
            })?;
            if count == 0 {
                return Err(Error::CodecFailure("opus packet with zero frames".into()));
            }
            Ok(count)
        }
    }
}

/// Samples per channel carried by `packet` when decoded at `sample_rate`.
pub fn packet_samples(packet: &[u8], sample_rate: u32) -> Result<usize> {
    let frames = frame_count(packet)?;
    let fd = TOC::new(packet[0]).frame_duration();
    if frames as u32 * fd.micros() > MAX_PACKET_DURATION_MICROS {
        return Err(Error::CodecFailure(format!(
            "opus packet of {} x {} exceeds 120ms",
            frames, fd
        )));
    }
    Ok(frames * fd.samples_at(sample_rate))
}

/// Decode-only codec that reads the sample count from the TOC byte.
///
/// Produces silence of the right length. Useful for packing packets that
/// were encoded elsewhere when no native decoder is linked.
#[derive(Debug, Clone)]
pub struct TocProbe {
    sample_rate: u32,
    channels: u8,
    frame_size: usize,
}

impl TocProbe {
    /// Creates a probe for a stream with the given layout.
    pub fn new(sample_rate: u32, channels: u8, frame_size: usize) -> Self {
        Self {
            sample_rate,
            channels,
            frame_size,
        }
    }

    /// Creates a probe matching a configuration.
    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(
            config.sample_rate,
            config.channel_count,
            config.frame_size_samples(),
        )
    }
}

impl OpusCodec for TocProbe {
    fn channels(&self) -> u8 {
        self.channels
    }

    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn encode(&mut self, _frame: &[i16]) -> Result<Vec<u8>> {
        Err(Error::CodecFailure("toc probe cannot encode".into()))
    }

    fn decode(&mut self, packet: &[u8]) -> Result<DecodedFrame> {
        let samples_per_channel = packet_samples(packet, self.sample_rate)?;
        Ok(DecodedFrame {
            pcm: vec![0; samples_per_channel * self.channels as usize],
            samples_per_channel,
        })
    }
}
