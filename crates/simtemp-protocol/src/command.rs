//! Control Command Codes
//!
//! Commands use the classic ioctl number layout:
//! `dir << 30 | size << 16 | magic << 8 | nr`.

use crate::error::ProtocolError;
use crate::record::{ConfigRecord, StatsRecord};

/// Magic byte shared by all commands
pub const IOC_MAGIC: u8 = b'S';
/// Highest defined command number
pub const IOC_MAXNR: u32 = 7;

const IOC_NONE: u32 = 0;
const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

const fn ioc(dir: u32, nr: u32, size: usize) -> u32 {
    (dir << 30) | ((size as u32) << 16) | ((IOC_MAGIC as u32) << 8) | nr
}

/// Read the current configuration
pub const GET_CONFIG: u32 = ioc(IOC_READ, 1, ConfigRecord::SIZE_BYTES);
/// Replace interval, threshold and mode
pub const SET_CONFIG: u32 = ioc(IOC_WRITE, 2, ConfigRecord::SIZE_BYTES);
/// Read the statistics record
pub const GET_STATS: u32 = ioc(IOC_READ, 3, StatsRecord::SIZE_BYTES);
/// Zero all statistics counters
pub const RESET_STATS: u32 = ioc(IOC_NONE, 4, 0);
/// Start sampling
pub const ENABLE: u32 = ioc(IOC_NONE, 5, 0);
/// Stop sampling
pub const DISABLE: u32 = ioc(IOC_NONE, 6, 0);
/// Drop every buffered sample
pub const FLUSH_BUFFER: u32 = ioc(IOC_NONE, 7, 0);

/// A decoded control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    GetConfig,
    SetConfig(ConfigRecord),
    GetStats,
    ResetStats,
    Enable,
    Disable,
    FlushBuffer,
}

impl ControlCommand {
    /// Get the numeric command code
    pub fn code(&self) -> u32 {
        match self {
            ControlCommand::GetConfig => GET_CONFIG,
            ControlCommand::SetConfig(_) => SET_CONFIG,
            ControlCommand::GetStats => GET_STATS,
            ControlCommand::ResetStats => RESET_STATS,
            ControlCommand::Enable => ENABLE,
            ControlCommand::Disable => DISABLE,
            ControlCommand::FlushBuffer => FLUSH_BUFFER,
        }
    }

    /// Number of payload bytes the command writes back to the caller
    pub fn response_size(&self) -> usize {
        match self {
            ControlCommand::GetConfig => ConfigRecord::SIZE_BYTES,
            ControlCommand::GetStats => StatsRecord::SIZE_BYTES,
            _ => 0,
        }
    }

    /// Decode a command code and its input payload.
    ///
    /// Codes with a foreign magic, an out-of-range number or a mismatched
    /// direction/size are unsupported. A SET_CONFIG payload shorter than a
    /// config record is an invalid length.
    pub fn decode(code: u32, payload: &[u8]) -> Result<Self, ProtocolError> {
        let magic = (code >> 8) & 0xFF;
        let nr = code & 0xFF;
        if magic != u32::from(IOC_MAGIC) || nr == 0 || nr > IOC_MAXNR {
            return Err(ProtocolError::UnsupportedCommand(code));
        }

        let command = match code {
            GET_CONFIG => ControlCommand::GetConfig,
            SET_CONFIG => ControlCommand::SetConfig(ConfigRecord::from_bytes(payload)?),
            GET_STATS => ControlCommand::GetStats,
            RESET_STATS => ControlCommand::ResetStats,
            ENABLE => ControlCommand::Enable,
            DISABLE => ControlCommand::Disable,
            FLUSH_BUFFER => ControlCommand::FlushBuffer,
            other => return Err(ProtocolError::UnsupportedCommand(other)),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_layout() {
        // _IOR('S', 1, 16)
        assert_eq!(GET_CONFIG, (2 << 30) | (16 << 16) | (0x53 << 8) | 1);
        // _IO('S', 7)
        assert_eq!(FLUSH_BUFFER, 0x5307);
        assert_eq!(GET_STATS >> 16 & 0x3FFF, 48);
    }

    #[test]
    fn test_decode_known_commands() {
        assert_eq!(ControlCommand::decode(ENABLE, &[]), Ok(ControlCommand::Enable));
        assert_eq!(
            ControlCommand::decode(GET_STATS, &[]),
            Ok(ControlCommand::GetStats)
        );

        let record = ConfigRecord {
            sampling_ms: 250,
            threshold_mc: 40_000,
            mode: 2,
            flags: 0,
        };
        let decoded = ControlCommand::decode(SET_CONFIG, &record.to_bytes()).unwrap();
        assert_eq!(decoded, ControlCommand::SetConfig(record));
        assert_eq!(decoded.code(), SET_CONFIG);
    }

    #[test]
    fn test_unknown_commands_unsupported() {
        // Wrong magic
        assert_eq!(
            ControlCommand::decode(0x5405, &[]),
            Err(ProtocolError::UnsupportedCommand(0x5405))
        );
        // Number beyond the table
        assert!(ControlCommand::decode(0x5308, &[]).is_err());
        // Right number, wrong direction
        assert!(ControlCommand::decode((2 << 30) | 0x5305, &[]).is_err());
    }

    #[test]
    fn test_short_set_config_payload() {
        assert_eq!(
            ControlCommand::decode(SET_CONFIG, &[0u8; 10]),
            Err(ProtocolError::InvalidLength {
                expected: 16,
                actual: 10
            })
        );
    }
}
