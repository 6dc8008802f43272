//! Waveform Generator
//!
//! Maps `(mode, counter)` to a temperature in milli-degrees. The sine is a
//! fixed-point triangle approximation: one cycle is 6280 angle units and the
//! counter advances the angle by 300 per tick.

use config_store::DeviceProperties;
use rand::Rng;
use serde::{Deserialize, Serialize};
use simtemp_protocol::Mode;

const ANGLE_STEP: u64 = 300;
const ANGLE_PERIOD: u64 = 6280;
const QUARTER_TURN: i64 = 1570;
const THREE_QUARTER_TURN: i64 = 4710;
const SINE_SCALE: i64 = 1000;

const RAMP_PERIOD: u64 = 200;
const RAMP_PEAK: i64 = 100;

/// Waveform amplitudes (milli-degrees)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformParams {
    /// Centre of every waveform
    pub base_mc: i32,
    /// Amplitude in normal mode
    pub normal_range_mc: i32,
    /// Amplitude in noisy and ramp modes
    pub range_mc: i32,
    /// Noisy-mode offset is drawn from `[0, noise_range_mc)`
    pub noise_range_mc: i32,
}

impl Default for WaveformParams {
    fn default() -> Self {
        Self {
            base_mc: 25_000,
            normal_range_mc: 10_000,
            range_mc: 30_000,
            noise_range_mc: 2_000,
        }
    }
}

impl From<&DeviceProperties> for WaveformParams {
    fn from(props: &DeviceProperties) -> Self {
        Self {
            base_mc: props.base_temp_mc,
            normal_range_mc: props.normal_range_mc,
            range_mc: props.temp_range_mc,
            noise_range_mc: props.noise_range_mc,
        }
    }
}

/// Pure waveform function
#[derive(Debug, Clone, Copy, Default)]
pub struct Waveform {
    params: WaveformParams,
}

impl Waveform {
    /// Create a waveform with the given amplitudes
    pub fn new(params: WaveformParams) -> Self {
        Self { params }
    }

    /// Get the amplitudes
    pub fn params(&self) -> &WaveformParams {
        &self.params
    }

    /// Triangle approximation of `sin`, scaled to ±1000
    pub fn sine_approx(counter: u64) -> i64 {
        let angle = ((counter % ANGLE_PERIOD) * ANGLE_STEP % ANGLE_PERIOD) as i64;
        if angle < QUARTER_TURN {
            angle * SINE_SCALE / QUARTER_TURN
        } else if angle < THREE_QUARTER_TURN {
            SINE_SCALE - (angle - QUARTER_TURN) * SINE_SCALE / QUARTER_TURN
        } else {
            // Rises back to 0 so the wrap at the period is continuous
            -SINE_SCALE + (angle - THREE_QUARTER_TURN) * SINE_SCALE / QUARTER_TURN
        }
    }

    /// Ramp offset: 0 → range over 100 ticks, then back to 0
    pub fn ramp_offset(&self, counter: u64) -> i64 {
        let k = (counter % RAMP_PERIOD) as i64;
        let range = i64::from(self.params.range_mc);
        if k <= RAMP_PEAK {
            k * range / RAMP_PEAK
        } else {
            (RAMP_PERIOD as i64 - k) * range / RAMP_PEAK
        }
    }

    /// Draw a noisy-mode offset from `[0, noise_range)`
    pub fn noise<R: Rng>(&self, rng: &mut R) -> i64 {
        if self.params.noise_range_mc <= 0 {
            return 0;
        }
        i64::from(rng.gen_range(0..self.params.noise_range_mc))
    }

    /// Temperature for `mode` at tick `counter`
    pub fn temperature<R: Rng>(&self, mode: Mode, counter: u64, rng: &mut R) -> i32 {
        let base = i64::from(self.params.base_mc);
        let temp = match mode {
            Mode::Normal => {
                base + i64::from(self.params.normal_range_mc) * Self::sine_approx(counter) / SINE_SCALE
            }
            Mode::Noisy => {
                base + i64::from(self.params.range_mc) * Self::sine_approx(counter) / SINE_SCALE
                    + self.noise(rng)
            }
            Mode::Ramp => base + self.ramp_offset(counter),
        };
        saturate(temp)
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_sine_approx_shape() {
        assert_eq!(Waveform::sine_approx(0), 0);
        // angle 1500
        assert_eq!(Waveform::sine_approx(5), 955);
        // angle 3000
        assert_eq!(Waveform::sine_approx(10), 1000 - 1430 * 1000 / 1570);
        // angle 6000, rising back towards zero
        assert_eq!(Waveform::sine_approx(20), -1000 + 1290 * 1000 / 1570);
    }

    #[test]
    fn test_normal_mode_range() {
        let waveform = Waveform::default();
        let mut rng = rng();
        for counter in 0..10_000 {
            let temp = waveform.temperature(Mode::Normal, counter, &mut rng);
            assert!((15_000..=35_000).contains(&temp), "temp {} at {}", temp, counter);
        }
    }

    #[test]
    fn test_ramp_sweep() {
        let waveform = Waveform::default();
        let mut rng = rng();
        let temps: Vec<i32> = (0..200)
            .map(|c| waveform.temperature(Mode::Ramp, c, &mut rng))
            .collect();
        assert_eq!(temps[0], 25_000);
        assert_eq!(temps[100], 55_000);
        assert_eq!(temps[199], 25_300);
        assert!(temps.iter().all(|t| *t >= 25_000));
        // Next period restarts at base
        assert_eq!(waveform.temperature(Mode::Ramp, 200, &mut rng), 25_000);
    }

    #[test]
    fn test_zero_noise_range() {
        let waveform = Waveform::new(WaveformParams {
            noise_range_mc: 0,
            ..Default::default()
        });
        let mut rng = rng();
        assert_eq!(waveform.noise(&mut rng), 0);
    }

    proptest! {
        #[test]
        fn prop_noise_is_one_sided(counter in 0u64..1_000_000, seed in any::<u64>()) {
            let waveform = Waveform::default();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let clean = 25_000 + 30_000 * Waveform::sine_approx(counter) / 1000;
            let noisy = i64::from(waveform.temperature(Mode::Noisy, counter, &mut rng));
            let offset = noisy - clean;
            prop_assert!((0..2_000).contains(&offset));
        }
    }
}
