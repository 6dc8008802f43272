//! Bounded Sample Buffer
//!
//! Provides the fixed-capacity FIFO that sits between the sample generator
//! and its consumers, plus the notifier that wakes consumers when samples
//! arrive or the device goes away.

mod buffer;
mod readiness;

pub use buffer::{BufferError, SampleBuffer, DEFAULT_CAPACITY};
pub use readiness::ReadinessNotifier;
