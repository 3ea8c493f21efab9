//! Error types for the Ogg/Opus packer.

use std::io;

/// Result type alias for packer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for packer operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad sample rate, channel count or other construction parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A frame did not have the configured number of samples.
    #[error("frame size mismatch: expected {expected} samples, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    /// The trailing chunk handed in for padding is longer than one frame.
    #[error("last packet too large: {len} samples exceeds frame size {frame_size}")]
    PacketTooLarge { len: usize, frame_size: usize },

    /// The codec adapter failed to encode or decode.
    #[error("codec failure: {0}")]
    CodecFailure(String),

    /// No page has completed since the last read.
    #[error("no completed ogg page available")]
    EmptyOutput,

    /// Operation not allowed in the current stream state.
    #[error("illegal state transition: cannot {operation} in state {state}")]
    IllegalStateTransition {
        state: &'static str,
        operation: &'static str,
    },

    /// IO error from the page writer or reader.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Malformed page while reading a stream back.
    #[error("invalid page: {0}")]
    InvalidPage(String),

    /// Page checksum does not match its contents.
    #[error("checksum mismatch: page carries {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

impl Error {
    /// Returns false for conditions the caller is expected to retry later.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::EmptyOutput)
    }

    pub(crate) fn illegal(state: &'static str, operation: &'static str) -> Self {
        Error::IllegalStateTransition { state, operation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_output_is_not_fatal() {
        assert!(!Error::EmptyOutput.is_fatal());
        assert!(Error::CodecFailure("boom".into()).is_fatal());
        assert!(Error::illegal("closed", "add packet").is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = Error::FrameSizeMismatch { expected: 960, actual: 100 };
        assert!(err.to_string().contains("expected 960"));

        let err = Error::illegal("closed", "add packet");
        assert_eq!(
            err.to_string(),
            "illegal state transition: cannot add packet in state closed"
        );

        let err = Error::ChecksumMismatch { expected: 1, actual: 2 };
        assert!(err.to_string().contains("0x00000001"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
