//! PCM input handling.
//!
//! Input is interleaved signed 16-bit audio. [`FrameSegmenter`] cuts it
//! into frames of the codec's size; the helpers here convert between
//! little-endian bytes and samples.

mod segmenter;

pub use segmenter::{FrameSegmenter, Segmented, pad_last_frame};

/// Decodes little-endian 16-bit samples.
///
/// A trailing odd byte is ignored; callers streaming bytes keep it for
/// the next call.
pub fn samples_from_le_bytes(data: &[u8]) -> Vec<i16> {
    data.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Encodes samples as little-endian bytes.
pub fn samples_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}
