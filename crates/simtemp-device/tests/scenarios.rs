//! End-to-end device scenarios on paused time

use simtemp_device::{Device, DeviceError, DeviceProperties, Mode, ReadMode};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

fn device_with(capacity: usize) -> Arc<Device> {
    Device::create(DeviceProperties {
        buffer_capacity: capacity,
        noise_seed: Some(11),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn produces_on_cadence_for_ten_seconds() {
    let device = device_with(64);
    device.enable().await.unwrap();

    let consumer = tokio::spawn({
        let device = device.clone();
        async move {
            let mut received = 0u64;
            while device.read(ReadMode::Blocking).await.is_ok() {
                received += 1;
            }
            received
        }
    });

    sleep(Duration::from_millis(10_050)).await;
    device.disable().await.unwrap();
    let received = consumer.await.unwrap();

    let stats = device.statistics();
    let produced = stats.updates + stats.lost;
    assert!((95..=105).contains(&produced), "produced {}", produced);
    assert_eq!(stats.lost, 0);
    assert_eq!(received, stats.updates);
}

#[tokio::test(start_paused = true)]
async fn ramp_sweeps_with_two_crossings_per_period() {
    let device = device_with(512);
    device
        .update_config(|c| {
            c.mode = Mode::Ramp;
            c.sampling_ms = 1;
            c.enabled = true;
        })
        .await
        .unwrap();

    sleep(Duration::from_micros(400_500)).await;
    device.disable().await.unwrap();

    let mut samples = Vec::new();
    while let Ok(sample) = device.read(ReadMode::NonBlocking).await {
        samples.push(sample);
    }
    assert_eq!(samples.len(), 400);
    assert_eq!(samples[0].temp_mc, 25_000);
    assert_eq!(samples[100].temp_mc, 55_000);
    assert_eq!(samples[200].temp_mc, 25_000);

    let crossings = samples.iter().filter(|s| s.threshold_crossed()).count();
    assert_eq!(crossings, 4);
    assert_eq!(device.statistics().alerts, 4);
    assert!(samples.windows(2).all(|w| w[0].timestamp_ns < w[1].timestamp_ns));
}

#[tokio::test(start_paused = true)]
async fn full_buffer_keeps_oldest_samples() {
    let device = device_with(4);
    device.enable().await.unwrap();
    sleep(Duration::from_millis(650)).await;
    device.disable().await.unwrap();

    let stats = device.statistics();
    assert_eq!(stats.updates, 4);
    assert_eq!(stats.lost, 2);
    assert_eq!(stats.last_error, -75);

    let first = device.read(ReadMode::NonBlocking).await.unwrap();
    assert_eq!(first.timestamp_ns, 100_000_000);
}

#[tokio::test(start_paused = true)]
async fn concurrent_consumers_each_get_distinct_samples() {
    let device = device_with(64);
    device
        .update_config(|c| {
            c.sampling_ms = 5;
            c.enabled = true;
        })
        .await
        .unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let device = device.clone();
            tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Ok(sample) = device.read(ReadMode::Blocking).await {
                    seen.push(sample.timestamp_ns);
                }
                seen
            })
        })
        .collect();

    sleep(Duration::from_millis(502)).await;
    device.disable().await.unwrap();

    let mut all = Vec::new();
    for reader in readers {
        let seen = reader.await.unwrap();
        // Each consumer observes production order
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        all.extend(seen);
    }
    let unique: HashSet<u64> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len());
    assert_eq!(all.len() as u64, device.statistics().updates);
}

#[tokio::test(start_paused = true)]
async fn teardown_releases_blocked_readers() {
    let device = device_with(64);
    device
        .update_config(|c| {
            c.sampling_ms = 10_000;
            c.enabled = true;
        })
        .await
        .unwrap();

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let device = device.clone();
            tokio::spawn(async move { device.read(ReadMode::Blocking).await })
        })
        .collect();
    let session = device.open(false).unwrap();
    sleep(Duration::from_millis(5)).await;

    timeout(Duration::from_millis(10), device.shutdown()).await.unwrap();
    for reader in readers {
        assert_eq!(reader.await.unwrap(), Err(DeviceError::Disabled));
    }

    let mut buf = [0u8; 16];
    assert_eq!(session.read(&mut buf).await, Err(DeviceError::Gone));
    assert!(matches!(device.set_config(device.config()).await, Err(DeviceError::Gone)));
    drop(session);
    assert_eq!(device.statistics().open_sessions, 0);
}

#[tokio::test(start_paused = true)]
async fn interval_change_while_armed_takes_effect() {
    let device = device_with(64);
    device.enable().await.unwrap();
    sleep(Duration::from_millis(1_050)).await;
    assert_eq!(device.statistics().updates, 10);

    device.update_config(|c| c.sampling_ms = 10).await.unwrap();
    sleep(Duration::from_millis(105)).await;
    device.disable().await.unwrap();

    assert_eq!(device.statistics().updates, 20);
}
