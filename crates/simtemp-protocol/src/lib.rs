//! Simulated Temperature Sensor Protocol
//!
//! This crate defines everything that crosses the device boundary: the
//! 16-byte sample record, the configuration and statistics payloads used by
//! the control-command interface, the waveform modes and the command codes.

pub mod command;
mod error;
mod mode;
mod record;

pub use command::ControlCommand;
pub use error::ProtocolError;
pub use mode::Mode;
pub use record::{ConfigRecord, Sample, StatsRecord};

/// Sample flag bits
pub mod flags {
    /// Set on every freshly generated sample
    pub const NEW_SAMPLE: u32 = 1 << 0;
    /// Set when the sample crossed the configured threshold
    pub const THRESHOLD_CROSSED: u32 = 1 << 1;
}

/// Errno-style codes reported as `last_error` and by the bridges
pub mod errno {
    /// Interrupted wait
    pub const EINTR: i32 = 4;
    /// No data available in non-blocking mode
    pub const EAGAIN: i32 = 11;
    /// Bad caller buffer
    pub const EFAULT: i32 = 14;
    /// Device disabled or gone
    pub const ENODEV: i32 = 19;
    /// Invalid argument
    pub const EINVAL: i32 = 22;
    /// Unsupported control command
    pub const ENOTTY: i32 = 25;
    /// Sample buffer overflow
    pub const EOVERFLOW: i32 = 75;
}
