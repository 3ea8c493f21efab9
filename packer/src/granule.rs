//! Granule position accounting.
//!
//! Ogg Opus granule positions count samples per channel. Packets encoded
//! here report their size directly; packets encoded elsewhere are decoded
//! once to learn it.

use crate::codec::opus::OpusCodec;
use crate::error::{Error, Result};

/// What the caller knows about a packet's length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCount {
    /// Samples per channel, as reported by the encoder.
    PerChannel(usize),
    /// Interleaved samples across all channels.
    Interleaved(usize),
    /// Not known; the packet is decoded to find out.
    Unknown,
}

/// Turns packets into granule position increments.
#[derive(Debug, Clone)]
pub struct GranuleAccountant {
    channels: u8,
    total: u64,
}

impl GranuleAccountant {
    /// Creates an accountant for a stream with `channels` channels.
    pub fn new(channels: u8) -> Self {
        Self {
            channels: channels.max(1),
            total: 0,
        }
    }

    /// Returns the granule delta for `packet` and adds it to the total.
    pub fn delta<C: OpusCodec + ?Sized>(
        &mut self,
        codec: &mut C,
        packet: &[u8],
        samples: SampleCount,
    ) -> Result<u64> {
        let delta = self.measure(codec, packet, samples)?;
        self.commit(delta);
        Ok(delta)
    }

    /// Returns the granule delta for `packet` without counting it.
    ///
    /// With [`SampleCount::Unknown`] the packet is decoded through `codec`
    /// and the audio is discarded. Pair with [`commit`](Self::commit) once
    /// the packet is accepted.
    pub fn measure<C: OpusCodec + ?Sized>(
        &self,
        codec: &mut C,
        packet: &[u8],
        samples: SampleCount,
    ) -> Result<u64> {
        let per_channel = match samples {
            SampleCount::PerChannel(n) => n,
            SampleCount::Interleaved(n) => {
                let channels = self.channels as usize;
                if n % channels != 0 {
                    return Err(Error::FrameSizeMismatch {
                        expected: n - n % channels,
                        actual: n,
                    });
                }
                n / channels
            }
            SampleCount::Unknown => codec.decode(packet)?.samples_per_channel,
        };
        Ok(per_channel as u64)
    }

    /// Adds an accepted packet's delta to the total.
    pub fn commit(&mut self, delta: u64) {
        self.total += delta;
    }

    /// Returns samples per channel accounted so far.
    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::opus::TocProbe;
    use crate::codec::opus::testing::StubCodec;

    #[test]
    fn test_known_counts_skip_decode() {
        let mut codec = StubCodec::new(2, 1920, 10);
        let mut acc = GranuleAccountant::new(2);
        assert_eq!(acc.delta(&mut codec, &[], SampleCount::PerChannel(960)).unwrap(), 960);
        assert_eq!(acc.delta(&mut codec, &[], SampleCount::Interleaved(1920)).unwrap(), 960);
        assert_eq!(codec.decoded, 0);
        assert_eq!(acc.total(), 1920);
    }

    #[test]
    fn test_interleaved_must_divide() {
        let mut codec = StubCodec::new(2, 1920, 10);
        let mut acc = GranuleAccountant::new(2);
        assert!(matches!(
            acc.delta(&mut codec, &[], SampleCount::Interleaved(961)),
            Err(Error::FrameSizeMismatch { expected: 960, actual: 961 })
        ));
        assert_eq!(acc.total(), 0);
    }

    #[test]
    fn test_unknown_decodes() {
        let mut codec = StubCodec::new(1, 320, 10);
        let mut acc = GranuleAccountant::new(1);
        assert_eq!(acc.delta(&mut codec, &[0xF8], SampleCount::Unknown).unwrap(), 320);
        assert_eq!(codec.decoded, 1);

        // decode failures surface
        assert!(acc.delta(&mut codec, &[], SampleCount::Unknown).is_err());
        assert_eq!(acc.total(), 320);
    }

    #[test]
    fn test_measure_does_not_count() {
        let mut codec = StubCodec::new(1, 960, 10);
        let mut acc = GranuleAccountant::new(1);
        let delta = acc.measure(&mut codec, &[0xF8], SampleCount::Unknown).unwrap();
        assert_eq!(delta, 960);
        assert_eq!(acc.total(), 0);
        acc.commit(delta);
        assert_eq!(acc.total(), 960);
    }

    #[test]
    fn test_unknown_through_toc_probe() {
        let mut probe = TocProbe::new(16000, 1, 320);
        let mut acc = GranuleAccountant::new(1);
        // CELT FB 20ms, two frames
        assert_eq!(acc.delta(&mut probe, &[0xF9, 0x00], SampleCount::Unknown).unwrap(), 640);
    }

    #[test]
    fn test_dyn_codec() {
        let mut codec: Box<dyn OpusCodec> = Box::new(StubCodec::new(1, 960, 4));
        let mut acc = GranuleAccountant::new(1);
        assert_eq!(acc.delta(codec.as_mut(), &[0xF8], SampleCount::Unknown).unwrap(), 960);
    }
}
