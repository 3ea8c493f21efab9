//! Opus codec capability and Ogg Opus headers.
//!
//! The packer does not code audio itself: encoders and decoders are
//! plugged in through [`OpusCodec`]. With the `libopus` feature,
//! [`LibOpusCodec`] provides one backed by libopus.
//!
//! # Example
//!
//! ```
//! use ogg_opus_packer::codec::opus::{OpusCodec, TocProbe};
//!
//! // 20ms CELT fullband mono packet
//! let mut probe = TocProbe::new(48000, 1, 960);
//! let decoded = probe.decode(&[0xF8, 0x00]).unwrap();
//! assert_eq!(decoded.samples_per_channel, 960);
//! ```

mod codec;
mod header;
#[cfg(feature = "libopus")]
mod libopus;
mod toc;

#[cfg(test)]
pub(crate) use codec::testing;
pub use codec::*;
pub use header::*;
#[cfg(feature = "libopus")]
pub use libopus::*;
pub use toc::*;
