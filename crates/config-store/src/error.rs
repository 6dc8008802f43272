//! Validation Error Types

use simtemp_protocol::ProtocolError;
use thiserror::Error;

/// Errors raised when a configuration candidate is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Mode name or code not recognized
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    /// Candidate could not be parsed
    #[error("Invalid data format for {field}: {input:?}")]
    InvalidFormat { field: &'static str, input: String },

    /// Reserved bits set in a structured candidate
    #[error("Reserved flags must be zero, got {0:#x}")]
    ReservedFlags(u32),
}

impl From<ProtocolError> for ValidationError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::UnknownMode(mode) => ValidationError::UnknownMode(mode),
            other => ValidationError::InvalidFormat {
                field: "record",
                input: other.to_string(),
            },
        }
    }
}
