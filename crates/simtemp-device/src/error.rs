//! Device Error Types

use config_store::ValidationError;
use sample_buffer::BufferError;
use simtemp_protocol::{errno, ProtocolError};
use thiserror::Error;

/// Errors returned by device operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Configuration candidate rejected; nothing was changed
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// No sample available and the caller asked not to wait
    #[error("No sample available")]
    WouldBlock,

    /// Blocking wait aborted by the caller
    #[error("Wait interrupted")]
    Interrupted,

    /// Device is disabled (or was disabled while waiting)
    #[error("Device is disabled")]
    Disabled,

    /// Malformed request, e.g. a read shorter than one record
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller buffer cannot hold or does not contain the payload
    #[error("Bad caller buffer: {0}")]
    Fault(String),

    /// Unrecognized control command
    #[error("Control command {0:#010x} not supported")]
    NotSupported(u32),

    /// Unknown attribute name
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Write to a read-only attribute
    #[error("Attribute {0} is read-only")]
    ReadOnly(&'static str),

    /// Device could not be created
    #[error("Device initialization failed: {0}")]
    Init(String),

    /// Device has been torn down
    #[error("Device has been torn down")]
    Gone,
}

impl DeviceError {
    /// Errno-style code for this error
    pub fn errno(&self) -> i32 {
        match self {
            DeviceError::Validation(_)
            | DeviceError::InvalidArgument(_)
            | DeviceError::UnknownAttribute(_)
            | DeviceError::ReadOnly(_)
            | DeviceError::Init(_) => errno::EINVAL,
            DeviceError::WouldBlock => errno::EAGAIN,
            DeviceError::Interrupted => errno::EINTR,
            DeviceError::Disabled | DeviceError::Gone => errno::ENODEV,
            DeviceError::Fault(_) => errno::EFAULT,
            DeviceError::NotSupported(_) => errno::ENOTTY,
        }
    }
}

impl From<ProtocolError> for DeviceError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::UnsupportedCommand(code) => DeviceError::NotSupported(code),
            ProtocolError::UnknownMode(mode) => {
                DeviceError::Validation(ValidationError::UnknownMode(mode))
            }
            ProtocolError::InvalidLength { .. } | ProtocolError::BufferTooSmall { .. } => {
                DeviceError::Fault(err.to_string())
            }
        }
    }
}

impl From<BufferError> for DeviceError {
    fn from(err: BufferError) -> Self {
        DeviceError::Init(err.to_string())
    }
}
