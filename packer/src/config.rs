//! Stream configuration.

use serde::{Deserialize, Serialize};

use crate::codec::opus::FrameDuration;
use crate::error::{Error, Result};

/// Sample rates accepted by Opus.
pub const SUPPORTED_SAMPLE_RATES: [u32; 5] = [8000, 12000, 16000, 24000, 48000];

/// Vendor string written into `OpusTags` when none is configured.
pub const DEFAULT_VENDOR: &str = "ogg-opus-packer";

/// Configuration for a packer, muxer or segmenter.
///
/// ```
/// use ogg_opus_packer::{Config, codec::opus::FrameDuration};
///
/// let config = Config {
///     sample_rate: 16000,
///     frame_duration: FrameDuration::Duration20ms,
///     ..Config::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.frame_size_samples(), 320);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels (1 or 2).
    pub channel_count: u8,
    /// Duration of one codec frame.
    #[serde(rename = "frame_duration_ms")]
    pub frame_duration: FrameDuration,
    /// Stream serial number. A random one is drawn when unset.
    pub serial: Option<u32>,
    /// Samples to skip at the start of decode, written into `OpusHead`.
    pub pre_skip: u16,
    /// Vendor string written into `OpusTags`.
    pub vendor: String,
    /// User comments written into `OpusTags` as `KEY=value`.
    pub comments: Vec<(String, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channel_count: 1,
            frame_duration: FrameDuration::Duration60ms,
            serial: None,
            pre_skip: 0,
            vendor: DEFAULT_VENDOR.to_string(),
            comments: Vec::new(),
        }
    }
}

impl Config {
    /// Creates a configuration with the given rate and channel count.
    pub fn new(sample_rate: u32, channel_count: u8) -> Self {
        Self {
            sample_rate,
            channel_count,
            ..Self::default()
        }
    }

    /// Sets the frame duration.
    pub fn with_frame_duration(mut self, frame_duration: FrameDuration) -> Self {
        self.frame_duration = frame_duration;
        self
    }

    /// Fixes the stream serial number.
    pub fn with_serial(mut self, serial: u32) -> Self {
        self.serial = Some(serial);
        self
    }

    /// Adds a user comment.
    pub fn with_comment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.comments.push((key.into(), value.into()));
        self
    }

    /// Checks the configuration against what an Opus stream can carry.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(Error::InvalidConfiguration(format!(
                "unsupported sample rate {} Hz (expected one of {:?})",
                self.sample_rate, SUPPORTED_SAMPLE_RATES
            )));
        }
        if !(1..=2).contains(&self.channel_count) {
            return Err(Error::InvalidConfiguration(format!(
                "unsupported channel count {} (expected 1 or 2)",
                self.channel_count
            )));
        }
        for (key, _) in &self.comments {
            if key.is_empty() || key.contains('=') {
                return Err(Error::InvalidConfiguration(format!(
                    "invalid comment key {:?}",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Interleaved samples in one frame:
    /// `round(frame_duration_ms * sample_rate * channel_count / 1000)`.
    pub fn frame_size_samples(&self) -> usize {
        let micros = self.frame_duration.micros() as u64;
        let total = micros * self.sample_rate as u64 * self.channel_count as u64;
        ((total + 500_000) / 1_000_000) as usize
    }

    /// Samples per channel in one frame.
    pub fn frame_size_per_channel(&self) -> usize {
        self.frame_size_samples() / self.channel_count.max(1) as usize
    }

    /// Returns the configured serial or draws a random one.
    pub(crate) fn resolve_serial(&self) -> u32 {
        if let Some(serial) = self.serial {
            return serial;
        }
        match getrandom::u32() {
            Ok(serial) => serial,
            Err(e) => {
                tracing::warn!("getrandom failed ({}), using counter serial", e);
                fallback_serial()
            }
        }
    }
}

fn fallback_serial() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};
    static NEXT: AtomicU32 = AtomicU32::new(0x4f50_0000);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channel_count, 1);
        assert_eq!(config.frame_duration, FrameDuration::Duration60ms);
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_size_samples(), 2880);
    }

    #[test]
    fn test_frame_size_samples() {
        let config = Config::new(48000, 2).with_frame_duration(FrameDuration::Duration20ms);
        assert_eq!(config.frame_size_samples(), 1920);
        assert_eq!(config.frame_size_per_channel(), 960);

        let config = Config::new(8000, 1).with_frame_duration(FrameDuration::Duration2500us);
        assert_eq!(config.frame_size_samples(), 20);

        let config = Config::new(12000, 2).with_frame_duration(FrameDuration::Duration2500us);
        assert_eq!(config.frame_size_samples(), 60);
    }

    #[test]
    fn test_invalid_sample_rate() {
        let config = Config::new(44100, 1);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_invalid_channel_count() {
        assert!(Config::new(48000, 0).validate().is_err());
        assert!(Config::new(48000, 3).validate().is_err());
    }

    #[test]
    fn test_invalid_comment_key() {
        let config = Config::default().with_comment("A=B", "c");
        assert!(config.validate().is_err());
        let config = Config::default().with_comment("", "c");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_serial() {
        let config = Config::default().with_serial(99999);
        assert_eq!(config.resolve_serial(), 99999);
    }

    #[test]
    fn test_config_json() {
        let json = r#"{"sample_rate":16000,"channel_count":2,"frame_duration_ms":2.5}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.channel_count, 2);
        assert_eq!(config.frame_duration, FrameDuration::Duration2500us);
        assert_eq!(config.vendor, DEFAULT_VENDOR);

        let out = serde_json::to_string(&config).unwrap();
        assert!(out.contains("\"frame_duration_ms\":2.5"));
    }

    #[test]
    fn test_config_json_rejects_bad_duration() {
        let json = r#"{"frame_duration_ms":30}"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }
}
