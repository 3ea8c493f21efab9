//! Codec and container layers.
//!
//! - `opus`: codec capability, TOC parsing and Ogg Opus headers
//! - `ogg`: Ogg pages, stream assembly and the Opus muxer

pub mod ogg;
pub mod opus;
