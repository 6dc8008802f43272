//! Guarded Configuration Store
//!
//! Writers serialize on an async mutex, so a writer may suspend while it
//! validates. Readers never touch that mutex: every commit publishes an
//! immutable snapshot through a watch channel, which the producer reads
//! without suspending and the ticker observes for interval changes.

use crate::error::ValidationError;
use crate::validator::Validator;
use serde::{Deserialize, Serialize};
use simtemp_protocol::{ConfigRecord, Mode};
use std::time::Duration;
use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::{debug, info};

/// Live sensor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Sampling interval (ms, 1..=10000)
    pub sampling_ms: u32,
    /// Alert threshold (milli-degrees)
    pub threshold_mc: i32,
    /// Waveform mode
    pub mode: Mode,
    /// Whether the producer is running
    pub enabled: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            sampling_ms: 100,
            threshold_mc: 45_000,
            mode: Mode::Normal,
            enabled: false,
        }
    }
}

impl Configuration {
    /// Sampling interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.sampling_ms))
    }

    /// Structured record view (without `enabled`)
    pub fn to_record(&self) -> ConfigRecord {
        ConfigRecord {
            sampling_ms: self.sampling_ms,
            threshold_mc: self.threshold_mc,
            mode: self.mode.as_code(),
            flags: 0,
        }
    }
}

/// Result of a committed write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigChange {
    pub previous: Configuration,
    pub current: Configuration,
}

impl ConfigChange {
    /// `Some(new_state)` if the write toggled `enabled`
    pub fn enabled_transition(&self) -> Option<bool> {
        (self.previous.enabled != self.current.enabled).then_some(self.current.enabled)
    }

    /// Whether the sampling interval changed
    pub fn interval_changed(&self) -> bool {
        self.previous.sampling_ms != self.current.sampling_ms
    }

    /// Whether nothing changed
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

/// Configuration store with its own lock domain
pub struct ConfigStore {
    /// Serializes writers
    writer: Mutex<()>,
    /// Published snapshot
    current: watch::Sender<Configuration>,
    validator: Validator,
}

impl ConfigStore {
    /// Create a store holding a validated initial configuration
    pub fn new(initial: Configuration) -> Result<Self, ValidationError> {
        let validator = Validator::new();
        validator.validate(&initial)?;
        let (current, _) = watch::channel(initial);
        info!("Configuration store created: {:?}", initial);
        Ok(Self {
            writer: Mutex::new(()),
            current,
            validator,
        })
    }

    /// Atomic read of the current configuration
    pub fn get(&self) -> Configuration {
        *self.current.borrow()
    }

    /// Subscribe to committed configurations
    pub fn subscribe(&self) -> watch::Receiver<Configuration> {
        self.current.subscribe()
    }

    /// The validator every write goes through
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Acquire the writer lock
    pub async fn lock(&self) -> ConfigWriter<'_> {
        ConfigWriter {
            _guard: self.writer.lock().await,
            store: self,
        }
    }

    /// Validate and commit a full candidate
    pub async fn set(&self, candidate: Configuration) -> Result<ConfigChange, ValidationError> {
        self.lock().await.set(candidate)
    }
}

/// Exclusive write access to a [`ConfigStore`].
///
/// Holding the writer lets a caller commit and then act on the change
/// (arming or stopping the producer) before any other writer runs.
pub struct ConfigWriter<'a> {
    _guard: MutexGuard<'a, ()>,
    store: &'a ConfigStore,
}

impl ConfigWriter<'_> {
    /// Current committed configuration
    pub fn current(&self) -> Configuration {
        self.store.get()
    }

    /// Validate and commit `candidate`; on rejection nothing changes
    pub fn set(&mut self, candidate: Configuration) -> Result<ConfigChange, ValidationError> {
        self.store.validator.validate(&candidate)?;
        let previous = self.store.current.send_replace(candidate);
        let change = ConfigChange {
            previous,
            current: candidate,
        };
        if !change.is_noop() {
            debug!("Configuration committed: {:?} -> {:?}", previous, candidate);
        }
        Ok(change)
    }

    /// Apply `edit` to a copy of the current configuration and commit it
    pub fn update<F>(&mut self, edit: F) -> Result<ConfigChange, ValidationError>
    where
        F: FnOnce(&mut Configuration),
    {
        let mut candidate = self.current();
        edit(&mut candidate);
        self.set(candidate)
    }
}
