//! Output buffer for completed pages.

use std::io::{self, Write};

use bytes::{Bytes, BytesMut};

/// Append-only buffer of completed Ogg pages.
///
/// Pages come out in the order they were appended. Draining hands the
/// bytes over and clears the buffer, so each page is delivered once.
#[derive(Debug, Default)]
pub struct PageSink {
    buf: BytesMut,
}

impl PageSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sink with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Appends serialized page bytes.
    pub fn append(&mut self, page: &[u8]) {
        self.buf.extend_from_slice(page);
    }

    /// Takes everything accumulated so far, or `None` if nothing is ready.
    pub fn drain(&mut self) -> Option<Bytes> {
        if self.buf.is_empty() {
            return None;
        }
        Some(self.buf.split().freeze())
    }

    /// Returns the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Write for PageSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
