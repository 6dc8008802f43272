//! Protocol Error Types

use thiserror::Error;

/// Errors raised while encoding or decoding wire payloads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Input slice does not have the exact record length
    #[error("Invalid record length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Destination slice cannot hold the record
    #[error("Destination buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// Mode name or code not recognized
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    /// Control command code not recognized
    #[error("Unsupported control command {0:#010x}")]
    UnsupportedCommand(u32),
}
