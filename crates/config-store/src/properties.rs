//! Boot-Time Device Properties
//!
//! Consumed once when a device is created. Every property is optional and
//! falls back to the documented default.

use crate::store::Configuration;
use crate::validator::Validator;
use serde::{Deserialize, Serialize};
use simtemp_protocol::Mode;
use tracing::warn;

/// Properties a device is created from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProperties {
    /// Initial sampling interval (ms)
    pub sampling_ms: u32,
    /// Initial alert threshold (milli-degrees)
    #[serde(rename = "threshold_mC", alias = "threshold_mc")]
    pub threshold_mc: i32,
    /// Waveform base temperature (milli-degrees)
    #[serde(rename = "base_temp_mC", alias = "base_temp_mc")]
    pub base_temp_mc: i32,
    /// Amplitude of the noisy and ramp waveforms (milli-degrees)
    #[serde(rename = "temp_range_mC", alias = "temp_range_mc")]
    pub temp_range_mc: i32,
    /// Amplitude of the normal waveform (milli-degrees)
    #[serde(rename = "normal_range_mC", alias = "normal_range_mc")]
    pub normal_range_mc: i32,
    /// Upper bound (exclusive) of the noisy-mode offset (milli-degrees)
    #[serde(rename = "noise_range_mC", alias = "noise_range_mc")]
    pub noise_range_mc: i32,
    /// Sample buffer capacity
    pub buffer_capacity: usize,
    /// Seed for the noise generator (entropy when absent)
    pub noise_seed: Option<u64>,
}

impl Default for DeviceProperties {
    fn default() -> Self {
        Self {
            sampling_ms: 100,
            threshold_mc: 45_000,
            base_temp_mc: 25_000,
            temp_range_mc: 30_000,
            normal_range_mc: 10_000,
            noise_range_mc: 2_000,
            buffer_capacity: 64,
            noise_seed: None,
        }
    }
}

impl DeviceProperties {
    /// Initial configuration derived from these properties.
    ///
    /// An out-of-range interval falls back to the default with a warning;
    /// the device always starts disabled in normal mode.
    pub fn initial_configuration(&self) -> Configuration {
        let defaults = Configuration::default();
        let sampling_ms = match Validator::new().validate_sampling_ms(self.sampling_ms) {
            Ok(()) => self.sampling_ms,
            Err(e) => {
                warn!("Ignoring boot property: {}, using {} ms", e, defaults.sampling_ms);
                defaults.sampling_ms
            }
        };
        Configuration {
            sampling_ms,
            threshold_mc: self.threshold_mc,
            mode: Mode::Normal,
            enabled: false,
        }
    }
}
