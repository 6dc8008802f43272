//! Waveform Mode Definitions

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Waveform generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum Mode {
    /// Triangle approximation of a sine wave
    Normal = 0,
    /// Sine approximation with a one-sided random offset
    Noisy = 1,
    /// Triangular ramp above the base temperature
    Ramp = 2,
}

impl Mode {
    /// All modes in code order
    pub const ALL: [Mode; 3] = [Mode::Normal, Mode::Noisy, Mode::Ramp];

    /// Get the numeric code used in the config record
    pub fn as_code(&self) -> u32 {
        *self as u32
    }

    /// Decode a numeric mode code.
    ///
    /// Unknown codes are rejected here, so a stored configuration and the
    /// waveform only ever see the three modes above.
    pub fn from_code(code: u32) -> Result<Self, ProtocolError> {
        match code {
            0 => Ok(Mode::Normal),
            1 => Ok(Mode::Noisy),
            2 => Ok(Mode::Ramp),
            other => Err(ProtocolError::UnknownMode(other.to_string())),
        }
    }

    /// Get the textual name used by the attribute interface
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Noisy => "noisy",
            Mode::Ramp => "ramp",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Normal
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.name() == name)
            .ok_or_else(|| ProtocolError::UnknownMode(name.to_string()))
    }
}
