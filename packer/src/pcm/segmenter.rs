//! Slices interleaved PCM into codec-sized frames.

use crate::config::Config;
use crate::error::{Error, Result};

/// Frames cut out of one [`FrameSegmenter::push`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmented {
    /// Complete frames, each exactly one frame long.
    pub frames: Vec<Vec<i16>>,
    /// Samples moved out of the buffer into `frames`.
    pub consumed: usize,
}

/// Buffers interleaved samples and emits fixed-size frames.
///
/// Samples that do not fill a frame stay buffered across calls.
#[derive(Debug, Clone)]
pub struct FrameSegmenter {
    frame_size: usize,
    buffer: Vec<i16>,
}

impl FrameSegmenter {
    /// Creates a segmenter for the configured frame size.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::with_frame_size(config.frame_size_samples())
    }

    /// Creates a segmenter with an explicit frame size in interleaved samples.
    pub fn with_frame_size(frame_size: usize) -> Result<Self> {
        if frame_size == 0 {
            return Err(Error::InvalidConfiguration("frame size must be positive".into()));
        }
        Ok(Self {
            frame_size,
            buffer: Vec::with_capacity(frame_size),
        })
    }

    /// Returns the frame size in interleaved samples.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Returns the number of buffered samples.
    pub fn remainder_len(&self) -> usize {
        self.buffer.len()
    }

    /// Appends samples and returns every frame that is now complete.
    pub fn push(&mut self, samples: &[i16]) -> Segmented {
        self.buffer.extend_from_slice(samples);

        let count = self.buffer.len() / self.frame_size;
        if count == 0 {
            return Segmented::default();
        }
        let consumed = count * self.frame_size;
        let frames = self.buffer[..consumed]
            .chunks_exact(self.frame_size)
            .map(<[i16]>::to_vec)
            .collect();
        self.buffer.drain(..consumed);
        Segmented { frames, consumed }
    }

    /// Emits the remainder zero-padded to one frame, if there is one.
    ///
    /// The buffer is empty afterwards, including on error.
    pub fn flush_with_padding(&mut self) -> Result<Option<Vec<i16>>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let rest = std::mem::take(&mut self.buffer);
        if rest.len() > self.frame_size {
            return Err(Error::FrameSizeMismatch {
                expected: self.frame_size,
                actual: rest.len(),
            });
        }
        pad_last_frame(&rest, self.frame_size).map(Some)
    }
}

/// Zero-pads a trailing chunk to exactly one frame.
///
/// Fails with [`Error::PacketTooLarge`] when the chunk is already longer
/// than a frame.
pub fn pad_last_frame(samples: &[i16], frame_size: usize) -> Result<Vec<i16>> {
    if samples.len() > frame_size {
        return Err(Error::PacketTooLarge {
            len: samples.len(),
            frame_size,
        });
    }
    let mut frame = Vec::with_capacity(frame_size);
    frame.extend_from_slice(samples);
    frame.resize(frame_size, 0);
    Ok(frame)
}
