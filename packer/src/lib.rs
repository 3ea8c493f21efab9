//! Incremental Ogg Opus stream packer.
//!
//! This crate turns interleaved 16-bit PCM, or Opus packets encoded
//! elsewhere, into an Ogg Opus stream (RFC 3533, RFC 7845) page by page:
//!
//! - `pcm`: frame segmentation of PCM input
//! - `codec::opus`: the codec capability, TOC parsing and header packets
//! - `codec::ogg`: page framing, the stream muxer and a page reader
//! - `granule`: granule position accounting
//! - `sink`: the output buffer of completed pages
//!
//! The Opus coding itself is injected through [`codec::opus::OpusCodec`].
//!
//! # Example
//!
//! ```rust
//! use ogg_opus_packer::{Config, OggOpusMuxer};
//!
//! let mut muxer = OggOpusMuxer::new(&Config::new(48000, 1)).unwrap();
//!
//! // one 20ms CELT packet, 960 samples at 48kHz
//! muxer.add_packet(&[0xF8, 0xFF, 0xFE], 960, false).unwrap();
//! muxer.close().unwrap();
//!
//! let ogg = muxer.read_pages().unwrap();
//! assert_eq!(&ogg[..4], b"OggS");
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod granule;
pub mod packer;
pub mod pcm;
pub mod sink;
pub mod skeleton;
pub mod writer;

pub use codec::ogg::{MuxerState, OggOpusMuxer};
pub use config::Config;
pub use error::{Error, Result};
pub use granule::{GranuleAccountant, SampleCount};
pub use packer::Packer;
pub use pcm::FrameSegmenter;
pub use sink::PageSink;
pub use writer::BufferWriter;
