//! Sample Generator
//!
//! Produces periodic temperature samples: a lightweight ticker schedules
//! work on the configured interval and a worker task, which exclusively
//! owns the generator state, computes each sample, detects threshold
//! crossings and pushes into the sample buffer.

mod generator;
mod state;
mod stats;
mod waveform;

pub use generator::{GeneratorContext, GeneratorPhase, SampleGenerator, TickOutcome};
pub use state::GeneratorState;
pub use stats::{Statistics, StatsSnapshot};
pub use waveform::{Waveform, WaveformParams};
