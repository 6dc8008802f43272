//! Generator State

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Per-device generator state, owned by exactly one producer at a time
#[derive(Debug, Clone)]
pub struct GeneratorState {
    /// Tick index, incremented once per generated sample
    counter: u64,
    /// Previous sample's temperature, for edge detection; starts at 0
    last_temp_mc: i32,
    /// Noise source for noisy mode
    rng: ChaCha8Rng,
}

impl GeneratorState {
    /// Create a fresh state; `seed` makes noise reproducible
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            counter: 0,
            last_temp_mc: 0,
            rng,
        }
    }

    /// Number of samples generated so far
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Temperature of the previous sample (0 before the first one)
    pub fn last_temperature(&self) -> i32 {
        self.last_temp_mc
    }

    /// Return the current tick index and advance it
    pub fn advance(&mut self) -> u64 {
        let current = self.counter;
        self.counter = self.counter.wrapping_add(1);
        current
    }

    pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Record `temp_mc` and report whether it crossed `threshold_mc`
    /// relative to the previous sample.
    ///
    /// The first sample is compared against 0, so it is flagged when the
    /// threshold lies between 0 and its temperature.
    pub fn observe(&mut self, temp_mc: i32, threshold_mc: i32) -> bool {
        let crossed = (self.last_temp_mc < threshold_mc) != (temp_mc < threshold_mc);
        self.last_temp_mc = temp_mc;
        crossed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_advance() {
        let mut state = GeneratorState::new(Some(1));
        assert_eq!(state.advance(), 0);
        assert_eq!(state.advance(), 1);
        assert_eq!(state.counter(), 2);
    }

    #[test]
    fn test_edge_detection() {
        let mut state = GeneratorState::new(Some(1));
        let threshold = 45_000;

        assert!(!state.observe(44_000, threshold)); // 0 and 44000 both below
        assert!(!state.observe(44_500, threshold)); // still below
        assert!(state.observe(45_000, threshold)); // reaching threshold counts as above
        assert!(!state.observe(50_000, threshold)); // staying above
        assert!(state.observe(44_999, threshold)); // back below
        assert_eq!(state.last_temperature(), 44_999);
    }

    #[test]
    fn test_first_sample_compared_against_zero() {
        let mut state = GeneratorState::new(Some(1));
        assert_eq!(state.last_temperature(), 0);
        assert!(state.observe(25_000, 20_000));
        assert!(!state.observe(25_300, 20_000));

        let mut state = GeneratorState::new(Some(1));
        assert!(!state.observe(-5_000, 20_000));
        let mut state = GeneratorState::new(Some(1));
        assert!(state.observe(-5_000, -1_000));
    }

    proptest! {
        #[test]
        fn prop_flag_iff_sides_differ(temps in prop::collection::vec(-100_000i32..100_000, 2..100), threshold in -100_000i32..100_000) {
            let mut state = GeneratorState::new(Some(3));
            state.observe(temps[0], threshold);
            for pair in temps.windows(2) {
                let expected = (pair[0] < threshold) != (pair[1] < threshold);
                prop_assert_eq!(state.observe(pair[1], threshold), expected);
            }
        }
    }
}
