//! Ogg Opus header packets (RFC 7845 Section 5).

use crate::config::Config;
use crate::error::{Error, Result};

/// Magic signature of the identification header.
pub const OPUS_HEAD_MAGIC: &[u8; 8] = b"OpusHead";

/// Magic signature of the comment header.
pub const OPUS_TAGS_MAGIC: &[u8; 8] = b"OpusTags";

/// Size of the identification header with channel mapping family 0.
pub const OPUS_HEAD_SIZE: usize = 19;

/// Identification header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpusHead {
    /// Version (always 1)
    pub version: u8,
    /// Output channel count
    pub channels: u8,
    /// Samples to discard at 48kHz when decoding starts
    pub pre_skip: u16,
    /// Original input sample rate
    pub sample_rate: u32,
    /// Output gain in Q7.8 dB
    pub output_gain: i16,
    /// Channel mapping family
    pub mapping_family: u8,
}

impl OpusHead {
    /// Builds the header for a configured stream.
    pub fn from_config(config: &Config) -> Self {
        Self {
            version: 1,
            channels: config.channel_count,
            pre_skip: config.pre_skip,
            sample_rate: config.sample_rate,
            output_gain: 0,
            mapping_family: 0,
        }
    }

    /// Serializes the 19-byte packet.
    pub fn to_bytes(&self) -> [u8; OPUS_HEAD_SIZE] {
        let mut header = [0u8; OPUS_HEAD_SIZE];
        header[..8].copy_from_slice(OPUS_HEAD_MAGIC);
        header[8] = self.version;
        header[9] = self.channels;
        header[10..12].copy_from_slice(&self.pre_skip.to_le_bytes());
        header[12..16].copy_from_slice(&self.sample_rate.to_le_bytes());
        header[16..18].copy_from_slice(&self.output_gain.to_le_bytes());
        header[18] = self.mapping_family;
        header
    }

    /// Parses an identification packet.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < OPUS_HEAD_SIZE || &data[..8] != OPUS_HEAD_MAGIC {
            return Err(Error::InvalidPage("not an OpusHead packet".into()));
        }
        Ok(Self {
            version: data[8],
            channels: data[9],
            pre_skip: u16::from_le_bytes([data[10], data[11]]),
            sample_rate: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
            output_gain: i16::from_le_bytes([data[16], data[17]]),
            mapping_family: data[18],
        })
    }
}

/// Comment header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpusTags {
    /// Encoder vendor string
    pub vendor: String,
    /// User comments as `KEY=value` strings
    pub comments: Vec<String>,
}

impl OpusTags {
    /// Builds the header for a configured stream.
    pub fn from_config(config: &Config) -> Self {
        Self {
            vendor: config.vendor.clone(),
            comments: config
                .comments
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect(),
        }
    }

    /// Serializes the packet.
    pub fn to_bytes(&self) -> Vec<u8> {
        let size = 16 + self.vendor.len() + self.comments.iter().map(|c| 4 + c.len()).sum::<usize>();
        let mut out = Vec::with_capacity(size);
        out.extend_from_slice(OPUS_TAGS_MAGIC);
        out.extend_from_slice(&(self.vendor.len() as u32).to_le_bytes());
        out.extend_from_slice(self.vendor.as_bytes());
        out.extend_from_slice(&(self.comments.len() as u32).to_le_bytes());
        for comment in &self.comments {
            out.extend_from_slice(&(comment.len() as u32).to_le_bytes());
            out.extend_from_slice(comment.as_bytes());
        }
        out
    }

    /// Parses a comment packet.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 8 || &data[..8] != OPUS_TAGS_MAGIC {
            return Err(Error::InvalidPage("not an OpusTags packet".into()));
        }
        let mut pos = 8;
        let vendor = read_string(data, &mut pos)?;
        let count = read_u32(data, &mut pos)? as usize;
        let mut comments = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            comments.push(read_string(data, &mut pos)?);
        }
        Ok(Self { vendor, comments })
    }
}

fn read_u32(data: &[u8], pos: &mut usize) -> Result<u32> {
    let bytes = data
        .get(*pos..*pos + 4)
        .ok_or_else(|| Error::InvalidPage("truncated OpusTags packet".into()))?;
    *pos += 4;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_string(data: &[u8], pos: &mut usize) -> Result<String> {
    let len = read_u32(data, pos)? as usize;
    let bytes = data
        .get(*pos..*pos + len)
        .ok_or_else(|| Error::InvalidPage("truncated OpusTags packet".into()))?;
    *pos += len;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}
