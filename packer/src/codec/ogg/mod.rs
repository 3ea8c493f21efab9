//! Ogg container format.
//!
//! Page framing and stream assembly per RFC 3533, and the Ogg Opus muxer
//! built on them (RFC 7845).

mod crc;
mod encoder;
mod muxer;
mod packet;
mod page;
mod stream;
pub mod sync;

pub use crc::*;
pub use encoder::*;
pub use muxer::{MuxerState, OggOpusMuxer};
pub use packet::*;
pub use page::*;
pub use stream::*;
pub use sync::{OggSync, PacketReader, read_pages};
