//! Textual Attribute Interface

use crate::device::Device;
use crate::error::DeviceError;
use simtemp_protocol::errno;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Named device attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    SamplingMs,
    ThresholdMc,
    Mode,
    Enabled,
    /// Read-only statistics dump
    Stats,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::SamplingMs,
        Attribute::ThresholdMc,
        Attribute::Mode,
        Attribute::Enabled,
        Attribute::Stats,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::SamplingMs => "sampling_ms",
            Attribute::ThresholdMc => "threshold_mC",
            Attribute::Mode => "mode",
            Attribute::Enabled => "enabled",
            Attribute::Stats => "stats",
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, Attribute::Stats)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|attr| attr.name() == s)
            .ok_or_else(|| DeviceError::UnknownAttribute(s.to_string()))
    }
}

impl Device {
    /// Render an attribute as text, newline-terminated
    pub fn show_attribute(&self, attr: Attribute) -> Result<String, DeviceError> {
        self.ensure_live()?;
        let config = self.config();
        Ok(match attr {
            Attribute::SamplingMs => format!("{}\n", config.sampling_ms),
            Attribute::ThresholdMc => format!("{}\n", config.threshold_mc),
            Attribute::Mode => format!("{}\n", config.mode),
            Attribute::Enabled => format!("{}\n", u8::from(config.enabled)),
            Attribute::Stats => self.statistics().to_string(),
        })
    }

    /// Parse `input` and commit it through the configuration validator
    pub async fn store_attribute(&self, attr: Attribute, input: &str) -> Result<(), DeviceError> {
        let validator = self.config.validator();
        let parsed = match attr {
            Attribute::SamplingMs => validator.parse_sampling_ms(input).map(AttributeValue::SamplingMs),
            Attribute::ThresholdMc => validator.parse_threshold_mc(input).map(AttributeValue::ThresholdMc),
            Attribute::Mode => validator.parse_mode(input).map(AttributeValue::Mode),
            Attribute::Enabled => validator.parse_enabled(input).map(AttributeValue::Enabled),
            Attribute::Stats => return Err(DeviceError::ReadOnly(attr.name())),
        };
        let value = parsed.map_err(|e| {
            self.stats.record_error(errno::EINVAL);
            DeviceError::from(e)
        })?;

        let config = self
            .update_config(|c| match value {
                AttributeValue::SamplingMs(v) => c.sampling_ms = v,
                AttributeValue::ThresholdMc(v) => c.threshold_mc = v,
                AttributeValue::Mode(v) => c.mode = v,
                AttributeValue::Enabled(v) => c.enabled = v,
            })
            .await?;
        info!("Attribute {} set: {:?}", attr, config);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum AttributeValue {
    SamplingMs(u32),
    ThresholdMc(i32),
    Mode(simtemp_protocol::Mode),
    Enabled(bool),
}
