//! Device Context and Lifecycle

use crate::error::DeviceError;
use crate::session::Session;
use config_store::{ConfigChange, ConfigStore, Configuration, DeviceProperties};
use sample_buffer::{ReadinessNotifier, SampleBuffer};
use sample_generator::{GeneratorContext, SampleGenerator, Statistics, StatsSnapshot, Waveform, WaveformParams};
use simtemp_protocol::errno;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One simulated sensor.
///
/// Created with [`Device::create`] and shared as `Arc<Device>` by every
/// consumer, writer and bridge.
pub struct Device {
    pub(crate) config: Arc<ConfigStore>,
    pub(crate) buffer: Arc<SampleBuffer>,
    pub(crate) notifier: Arc<ReadinessNotifier>,
    pub(crate) stats: Arc<Statistics>,
    generator: SampleGenerator,
    properties: DeviceProperties,
    torn_down: AtomicBool,
}

impl Device {
    /// Create a disabled device from boot-time properties.
    ///
    /// Any failure aborts creation; sub-resources built so far are dropped
    /// in reverse order.
    pub fn create(properties: DeviceProperties) -> Result<Arc<Self>, DeviceError> {
        info!("Creating simtemp device: {:?}", properties);

        let buffer = Arc::new(SampleBuffer::new(properties.buffer_capacity)?);
        let config = Arc::new(ConfigStore::new(properties.initial_configuration())?);
        let notifier = Arc::new(ReadinessNotifier::new());
        let stats = Arc::new(Statistics::new());

        let waveform = Waveform::new(WaveformParams::from(&properties));
        let ctx = GeneratorContext::new(
            buffer.clone(),
            config.clone(),
            stats.clone(),
            notifier.clone(),
            waveform,
        );
        let generator = SampleGenerator::new(ctx, properties.noise_seed);

        info!(
            "Simtemp device ready: interval={} ms, threshold={} mC, capacity={}",
            config.get().sampling_ms,
            config.get().threshold_mc,
            buffer.capacity()
        );

        Ok(Arc::new(Self {
            config,
            buffer,
            notifier,
            stats,
            generator,
            properties,
            torn_down: AtomicBool::new(false),
        }))
    }

    /// Boot-time properties this device was created from
    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    /// Current configuration
    pub fn config(&self) -> Configuration {
        self.config.get()
    }

    /// Validate and apply a full configuration candidate
    pub async fn set_config(&self, candidate: Configuration) -> Result<Configuration, DeviceError> {
        self.update_config(|c| *c = candidate).await
    }

    /// Apply `edit` to the current configuration, validate and commit it.
    ///
    /// An `enabled` transition arms or stops the producer before any other
    /// writer can observe the new configuration.
    pub async fn update_config<F>(&self, edit: F) -> Result<Configuration, DeviceError>
    where
        F: FnOnce(&mut Configuration),
    {
        let mut writer = self.config.lock().await;
        self.ensure_live()?;

        let change = match writer.update(edit) {
            Ok(change) => change,
            Err(e) => {
                warn!("Configuration rejected: {}", e);
                self.stats.record_error(errno::EINVAL);
                return Err(e.into());
            }
        };
        self.apply_transition(&change).await;
        Ok(change.current)
    }

    async fn apply_transition(&self, change: &ConfigChange) {
        match change.enabled_transition() {
            Some(true) => {
                self.generator.arm().await;
            }
            Some(false) => {
                self.generator.disarm().await;
                // Release consumers blocked on a device that stopped producing
                self.notifier.notify_all();
            }
            // The ticker picks interval changes up from the config watch
            None if change.interval_changed() => {
                debug!(
                    "Sampling interval {} ms -> {} ms",
                    change.previous.sampling_ms, change.current.sampling_ms
                );
            }
            None => {}
        }
    }

    /// Start sampling
    pub async fn enable(&self) -> Result<Configuration, DeviceError> {
        self.update_config(|c| c.enabled = true).await
    }

    /// Stop sampling and release blocked readers
    pub async fn disable(&self) -> Result<Configuration, DeviceError> {
        self.update_config(|c| c.enabled = false).await
    }

    /// Whether the producer is currently armed
    pub fn is_armed(&self) -> bool {
        self.generator.is_armed()
    }

    /// Statistics snapshot
    pub fn statistics(&self) -> StatsSnapshot {
        self.stats.snapshot(&self.buffer)
    }

    /// Zero all statistics counters
    pub fn reset_statistics(&self) {
        self.stats.reset(&self.buffer);
        info!("Statistics reset");
    }

    /// Drop every buffered sample, returning how many were discarded
    pub fn flush(&self) -> usize {
        let drained = self.buffer.clear();
        debug!("Flushed {} buffered samples", drained);
        drained
    }

    /// Open a byte-stream session
    pub fn open(self: &Arc<Self>, nonblocking: bool) -> Result<Session, DeviceError> {
        self.ensure_live()?;
        Ok(Session::new(self.clone(), nonblocking))
    }

    /// Whether [`Device::shutdown`] has run
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    pub(crate) fn ensure_live(&self) -> Result<(), DeviceError> {
        if self.is_torn_down() {
            Err(DeviceError::Gone)
        } else {
            Ok(())
        }
    }

    /// Tear the device down.
    ///
    /// Forces `enabled = false`, waits for any in-flight tick, releases every
    /// blocked consumer with [`DeviceError::Disabled`] and drops buffered
    /// samples. Later operations fail with [`DeviceError::Gone`]. Safe to
    /// call more than once.
    pub async fn shutdown(&self) {
        let mut writer = self.config.lock().await;
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("Tearing down simtemp device");

        if let Err(e) = writer.update(|c| c.enabled = false) {
            // Disabling cannot fail validation of an already-valid config
            warn!("Could not force-disable during teardown: {}", e);
        }
        self.generator.disarm().await;
        self.notifier.notify_all();

        let dropped = self.buffer.clear();
        info!("Simtemp device torn down ({} buffered samples dropped)", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtemp_protocol::Mode;
    use std::time::Duration;

    fn props() -> DeviceProperties {
        DeviceProperties {
            noise_seed: Some(42),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let device = Device::create(props()).unwrap();
        let config = device.config();
        assert_eq!(config.sampling_ms, 100);
        assert_eq!(config.threshold_mc, 45_000);
        assert_eq!(config.mode, Mode::Normal);
        assert!(!config.enabled);
        assert!(!device.is_armed());
        assert_eq!(device.statistics(), StatsSnapshot {
            buffer_capacity: 64,
            ..Default::default()
        });
    }

    #[test]
    fn test_zero_capacity_aborts_creation() {
        let result = Device::create(DeviceProperties {
            buffer_capacity: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(DeviceError::Init(_))));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let device = Device::create(props()).unwrap();
        let candidate = Configuration {
            sampling_ms: 20,
            threshold_mc: 30_000,
            mode: Mode::Noisy,
            enabled: false,
        };
        device.set_config(candidate).await.unwrap();
        assert_eq!(device.config(), candidate);
    }

    #[tokio::test]
    async fn test_invalid_write_is_atomic() {
        let device = Device::create(props()).unwrap();
        let before = device.config();
        let result = device
            .update_config(|c| {
                c.threshold_mc = 1;
                c.sampling_ms = 0;
            })
            .await;
        assert!(matches!(result, Err(DeviceError::Validation(_))));
        assert_eq!(device.config(), before);
        assert_eq!(device.statistics().last_error, -errno::EINVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_disable_arms_generator() {
        let device = Device::create(props()).unwrap();
        device.enable().await.unwrap();
        assert!(device.is_armed());

        tokio::time::sleep(Duration::from_millis(550)).await;
        device.disable().await.unwrap();
        assert!(!device.is_armed());
        assert_eq!(device.statistics().updates, 5);

        // No ticks while disabled
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(device.statistics().updates, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_and_reset() {
        let device = Device::create(props()).unwrap();
        device.enable().await.unwrap();
        tokio::time::sleep(Duration::from_millis(350)).await;
        device.disable().await.unwrap();

        assert_eq!(device.flush(), 3);
        assert_eq!(device.statistics().buffer_usage, 0);
        device.reset_statistics();
        assert_eq!(device.statistics().updates, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_is_final() {
        let device = Device::create(props()).unwrap();
        device.enable().await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;

        device.shutdown().await;
        assert!(device.is_torn_down());
        assert!(!device.is_armed());
        assert!(!device.config().enabled);
        assert_eq!(device.statistics().buffer_usage, 0);

        assert_eq!(device.enable().await, Err(DeviceError::Gone));
        assert!(matches!(device.open(false), Err(DeviceError::Gone)));
        // Second call is a no-op
        device.shutdown().await;
    }
}
