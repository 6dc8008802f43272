//! Configuration Validator
//!
//! Every write path (structured records, textual attributes, boot
//! properties) goes through these checks; no bridge validates on its own.

use crate::error::ValidationError;
use crate::store::Configuration;
use simtemp_protocol::{ConfigRecord, Mode};

/// Shortest sampling interval (ms)
pub const MIN_SAMPLING_MS: u32 = 1;
/// Longest sampling interval (ms)
pub const MAX_SAMPLING_MS: u32 = 10_000;

/// Stateless validator for configuration candidates
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a single value against an inclusive range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: i64,
        range: (i64, i64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate the sampling interval
    pub fn validate_sampling_ms(&self, sampling_ms: u32) -> Result<(), ValidationError> {
        self.validate_range(
            "sampling_ms",
            i64::from(sampling_ms),
            (i64::from(MIN_SAMPLING_MS), i64::from(MAX_SAMPLING_MS)),
        )
    }

    /// Validate a numeric mode code
    pub fn validate_mode_code(&self, code: u32) -> Result<Mode, ValidationError> {
        Ok(Mode::from_code(code)?)
    }

    /// Validate a complete candidate
    pub fn validate(&self, candidate: &Configuration) -> Result<(), ValidationError> {
        self.validate_sampling_ms(candidate.sampling_ms)
        // Threshold is unrestricted and mode is valid by construction
    }

    /// Turn a structured config record into a candidate, keeping `enabled`
    /// from the current configuration
    pub fn candidate_from_record(
        &self,
        record: &ConfigRecord,
        current: &Configuration,
    ) -> Result<Configuration, ValidationError> {
        if record.flags != 0 {
            return Err(ValidationError::ReservedFlags(record.flags));
        }
        let candidate = Configuration {
            sampling_ms: record.sampling_ms,
            threshold_mc: record.threshold_mc,
            mode: self.validate_mode_code(record.mode)?,
            enabled: current.enabled,
        };
        self.validate(&candidate)?;
        Ok(candidate)
    }

    /// Parse a textual sampling interval
    pub fn parse_sampling_ms(&self, input: &str) -> Result<u32, ValidationError> {
        let value: u32 = parse_field("sampling_ms", input)?;
        self.validate_sampling_ms(value)?;
        Ok(value)
    }

    /// Parse a textual threshold
    pub fn parse_threshold_mc(&self, input: &str) -> Result<i32, ValidationError> {
        parse_field("threshold_mC", input)
    }

    /// Parse a textual mode name
    pub fn parse_mode(&self, input: &str) -> Result<Mode, ValidationError> {
        Ok(input.parse::<Mode>()?)
    }

    /// Parse a textual enabled flag (`0` or `1`)
    pub fn parse_enabled(&self, input: &str) -> Result<bool, ValidationError> {
        match input.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(ValidationError::InvalidFormat {
                field: "enabled",
                input: other.to_string(),
            }),
        }
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, input: &str) -> Result<T, ValidationError> {
    let trimmed = input.trim();
    trimmed.parse().map_err(|_| ValidationError::InvalidFormat {
        field,
        input: trimmed.to_string(),
    })
}
