//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding wire signals.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Line exceeded the framing limit before a terminator was seen.
    #[error("line too long: {len} bytes exceeds maximum {max}")]
    LineTooLong {
        /// Bytes buffered when the limit was hit
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Line was not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    /// JSON envelope did not match any known signal.
    #[error("malformed signal: {0}")]
    Malformed(#[from] serde_json::Error),
}
