//! Wire Records
//!
//! All records use native byte order and carry no padding, so a record can be
//! handed to a consumer as-is and parsed back with a fixed layout.

use crate::error::ProtocolError;
use crate::flags;
use serde::{Deserialize, Serialize};

fn check_exact(bytes: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if bytes.len() != expected {
        return Err(ProtocolError::InvalidLength {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn check_room(dst: &[u8], needed: usize) -> Result<(), ProtocolError> {
    if dst.len() < needed {
        return Err(ProtocolError::BufferTooSmall {
            needed,
            actual: dst.len(),
        });
    }
    Ok(())
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_ne_bytes(raw)
}

fn i32_at(bytes: &[u8], offset: usize) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_ne_bytes(raw)
}

fn u64_at(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_ne_bytes(raw)
}

/// One timestamped temperature reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Monotonic timestamp (ns since device creation)
    pub timestamp_ns: u64,
    /// Temperature in milli-degrees Celsius
    pub temp_mc: i32,
    /// Flag bits, see [`crate::flags`]
    pub flags: u32,
}

impl Sample {
    /// Size of the wire record in bytes
    pub const SIZE_BYTES: usize = 16;

    /// Create a freshly generated sample
    pub fn new(timestamp_ns: u64, temp_mc: i32, threshold_crossed: bool) -> Self {
        let mut sample_flags = flags::NEW_SAMPLE;
        if threshold_crossed {
            sample_flags |= flags::THRESHOLD_CROSSED;
        }
        Self {
            timestamp_ns,
            temp_mc,
            flags: sample_flags,
        }
    }

    /// Whether the new-sample bit is set
    pub fn is_new(&self) -> bool {
        self.flags & flags::NEW_SAMPLE != 0
    }

    /// Whether the threshold-crossed bit is set
    pub fn threshold_crossed(&self) -> bool {
        self.flags & flags::THRESHOLD_CROSSED != 0
    }

    /// Temperature in degrees Celsius
    pub fn temperature_celsius(&self) -> f64 {
        f64::from(self.temp_mc) / 1000.0
    }

    /// Encode into the 16-byte wire record
    pub fn to_bytes(&self) -> [u8; Self::SIZE_BYTES] {
        let mut out = [0u8; Self::SIZE_BYTES];
        out[0..8].copy_from_slice(&self.timestamp_ns.to_ne_bytes());
        out[8..12].copy_from_slice(&self.temp_mc.to_ne_bytes());
        out[12..16].copy_from_slice(&self.flags.to_ne_bytes());
        out
    }

    /// Decode a 16-byte wire record
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_exact(bytes, Self::SIZE_BYTES)?;
        Ok(Self {
            timestamp_ns: u64_at(bytes, 0),
            temp_mc: i32_at(bytes, 8),
            flags: u32_at(bytes, 12),
        })
    }

    /// Copy the wire record into the front of `dst`, returning bytes written
    pub fn write_to(&self, dst: &mut [u8]) -> Result<usize, ProtocolError> {
        check_room(dst, Self::SIZE_BYTES)?;
        dst[..Self::SIZE_BYTES].copy_from_slice(&self.to_bytes());
        Ok(Self::SIZE_BYTES)
    }
}

/// Configuration payload of the GET/SET_CONFIG commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Sampling interval (ms)
    pub sampling_ms: u32,
    /// Alert threshold (milli-degrees)
    pub threshold_mc: i32,
    /// Mode code, see [`crate::Mode::as_code`]
    pub mode: u32,
    /// Reserved, must be zero
    pub flags: u32,
}

impl ConfigRecord {
    /// Size of the record in bytes
    pub const SIZE_BYTES: usize = 16;

    /// Encode into native byte order
    pub fn to_bytes(&self) -> [u8; Self::SIZE_BYTES] {
        let mut out = [0u8; Self::SIZE_BYTES];
        out[0..4].copy_from_slice(&self.sampling_ms.to_ne_bytes());
        out[4..8].copy_from_slice(&self.threshold_mc.to_ne_bytes());
        out[8..12].copy_from_slice(&self.mode.to_ne_bytes());
        out[12..16].copy_from_slice(&self.flags.to_ne_bytes());
        out
    }

    /// Decode from the front of `bytes` (trailing bytes are ignored)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < Self::SIZE_BYTES {
            return Err(ProtocolError::InvalidLength {
                expected: Self::SIZE_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            sampling_ms: u32_at(bytes, 0),
            threshold_mc: i32_at(bytes, 4),
            mode: u32_at(bytes, 8),
            flags: u32_at(bytes, 12),
        })
    }

    /// Copy into the front of `dst`, returning bytes written
    pub fn write_to(&self, dst: &mut [u8]) -> Result<usize, ProtocolError> {
        check_room(dst, Self::SIZE_BYTES)?;
        dst[..Self::SIZE_BYTES].copy_from_slice(&self.to_bytes());
        Ok(Self::SIZE_BYTES)
    }
}

/// Statistics payload of the GET_STATS command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Samples successfully buffered
    pub updates: u64,
    /// Threshold crossings among buffered samples
    pub alerts: u64,
    /// Samples dropped on a full buffer
    pub lost: u64,
    /// Read calls
    pub read_calls: u64,
    /// Readiness polls
    pub poll_calls: u64,
    /// Last recorded error (negative errno, 0 if none)
    pub last_error: i32,
    /// Current buffer occupancy
    pub buffer_usage: u32,
}

impl StatsRecord {
    /// Size of the record in bytes
    pub const SIZE_BYTES: usize = 48;

    /// Encode into native byte order
    pub fn to_bytes(&self) -> [u8; Self::SIZE_BYTES] {
        let mut out = [0u8; Self::SIZE_BYTES];
        out[0..8].copy_from_slice(&self.updates.to_ne_bytes());
        out[8..16].copy_from_slice(&self.alerts.to_ne_bytes());
        out[16..24].copy_from_slice(&self.lost.to_ne_bytes());
        out[24..32].copy_from_slice(&self.read_calls.to_ne_bytes());
        out[32..40].copy_from_slice(&self.poll_calls.to_ne_bytes());
        out[40..44].copy_from_slice(&self.last_error.to_ne_bytes());
        out[44..48].copy_from_slice(&self.buffer_usage.to_ne_bytes());
        out
    }

    /// Decode a 48-byte record
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_exact(bytes, Self::SIZE_BYTES)?;
        Ok(Self {
            updates: u64_at(bytes, 0),
            alerts: u64_at(bytes, 8),
            lost: u64_at(bytes, 16),
            read_calls: u64_at(bytes, 24),
            poll_calls: u64_at(bytes, 32),
            last_error: i32_at(bytes, 40),
            buffer_usage: u32_at(bytes, 44),
        })
    }

    /// Copy into the front of `dst`, returning bytes written
    pub fn write_to(&self, dst: &mut [u8]) -> Result<usize, ProtocolError> {
        check_room(dst, Self::SIZE_BYTES)?;
        dst[..Self::SIZE_BYTES].copy_from_slice(&self.to_bytes());
        Ok(Self::SIZE_BYTES)
    }
}
