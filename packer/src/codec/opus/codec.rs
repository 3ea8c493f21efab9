//! Opus codec capability.
//!
//! The packer never codes audio itself. Any Opus implementation can be
//! plugged in through [`OpusCodec`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Largest Opus packet libopus recommends allocating for.
pub const MAX_PACKET_SIZE: usize = 4000;

/// Samples per channel in the longest possible packet (120ms at 48kHz).
pub const MAX_FRAME_SAMPLES: usize = 5760;

/// Audio produced by decoding one packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Interleaved samples.
    pub pcm: Vec<i16>,
    /// Number of samples per channel.
    pub samples_per_channel: usize,
}

/// An Opus encoder/decoder pair.
///
/// Methods take `&mut self`, so a codec is used by one caller at a time.
/// Wrap it in [`SharedCodec`] to share it between pipelines.
pub trait OpusCodec: Send {
    /// Number of interleaved channels.
    fn channels(&self) -> u8;

    /// Interleaved samples the encoder expects per frame.
    fn frame_size(&self) -> usize;

    /// Encodes exactly one frame of interleaved samples.
    fn encode(&mut self, frame: &[i16]) -> Result<Vec<u8>>;

    /// Decodes one packet.
    fn decode(&mut self, packet: &[u8]) -> Result<DecodedFrame>;

    /// Releases native resources. Later calls fail with `CodecFailure`.
    fn close(&mut self) {}
}

/// Rejects frames whose length is not the configured frame size.
pub fn check_frame(frame: &[i16], frame_size: usize) -> Result<()> {
    if frame.len() != frame_size {
        return Err(Error::FrameSizeMismatch {
            expected: frame_size,
            actual: frame.len(),
        });
    }
    Ok(())
}

impl<C: OpusCodec + ?Sized> OpusCodec for Box<C> {
    fn channels(&self) -> u8 {
        (**self).channels()
    }

    fn frame_size(&self) -> usize {
        (**self).frame_size()
    }

    fn encode(&mut self, frame: &[i16]) -> Result<Vec<u8>> {
        (**self).encode(frame)
    }

    fn decode(&mut self, packet: &[u8]) -> Result<DecodedFrame> {
        (**self).decode(packet)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// A codec shared between owners.
///
/// Each encode/decode holds the lock for that single call only. Native
/// encoders are not reentrant, so concurrent callers are serialized here.
pub struct SharedCodec<C> {
    channels: u8,
    frame_size: usize,
    inner: Arc<Mutex<Option<C>>>,
}

impl<C: OpusCodec> SharedCodec<C> {
    /// Wraps a codec.
    pub fn new(codec: C) -> Self {
        Self {
            channels: codec.channels(),
            frame_size: codec.frame_size(),
            inner: Arc::new(Mutex::new(Some(codec))),
        }
    }

    /// Returns true once any owner has closed the codec.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().is_none()
    }

    fn with<T>(&self, f: impl FnOnce(&mut C) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.lock();
        match guard.as_mut() {
            Some(codec) => f(codec),
            None => Err(Error::CodecFailure("codec is closed".into())),
        }
    }
}

impl<C> Clone for SharedCodec<C> {
    fn clone(&self) -> Self {
        Self {
            channels: self.channels,
            frame_size: self.frame_size,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: OpusCodec> OpusCodec for SharedCodec<C> {
    fn channels(&self) -> u8 {
        self.channels
    }

    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn encode(&mut self, frame: &[i16]) -> Result<Vec<u8>> {
        self.with(|codec| codec.encode(frame))
    }

    fn decode(&mut self, packet: &[u8]) -> Result<DecodedFrame> {
        self.with(|codec| codec.decode(packet))
    }

    /// Closes the codec for every clone.
    fn close(&mut self) {
        if let Some(mut codec) = self.inner.lock().take() {
            codec.close();
        }
    }
}
