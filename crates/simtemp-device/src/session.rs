//! Byte-Stream Session
//!
//! The open/read/poll/control endpoint. Each read transfers exactly one
//! 16-byte sample record.

use crate::consumer::{ReadMode, Readiness};
use crate::device::Device;
use crate::error::DeviceError;
use simtemp_protocol::Sample;
use std::future::{pending, Future};
use std::sync::Arc;
use tracing::debug;

/// An open handle on the device
pub struct Session {
    device: Arc<Device>,
    nonblocking: bool,
}

impl Session {
    pub(crate) fn new(device: Arc<Device>, nonblocking: bool) -> Self {
        let open = device.stats.session_opened();
        debug!("Session opened (nonblocking={}, open={})", nonblocking, open);
        Self { device, nonblocking }
    }

    /// Device this session is bound to
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    pub fn is_nonblocking(&self) -> bool {
        self.nonblocking
    }

    pub fn set_nonblocking(&mut self, nonblocking: bool) {
        self.nonblocking = nonblocking;
    }

    /// Read one sample record into `dst`, returning the bytes written
    pub async fn read(&self, dst: &mut [u8]) -> Result<usize, DeviceError> {
        self.read_until(dst, pending::<()>()).await
    }

    /// Like [`Session::read`], interruptible by `interrupt`
    pub async fn read_until<F>(&self, dst: &mut [u8], interrupt: F) -> Result<usize, DeviceError>
    where
        F: Future<Output = ()>,
    {
        if dst.len() < Sample::SIZE_BYTES {
            return Err(DeviceError::InvalidArgument(format!(
                "read of {} bytes, a sample record is {}",
                dst.len(),
                Sample::SIZE_BYTES
            )));
        }
        let mode = ReadMode::from_nonblocking(self.nonblocking);
        let sample = self.device.read_until(mode, interrupt).await?;
        Ok(sample.write_to(dst)?)
    }

    /// Readiness poll
    pub fn poll(&self) -> Readiness {
        self.device.poll_readiness()
    }

    /// Execute a raw control command, see [`Device::control`]
    pub async fn control(&self, code: u32, payload: &mut [u8]) -> Result<usize, DeviceError> {
        self.device.control(code, payload).await
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let open = self.device.stats.session_closed();
        debug!("Session closed (open={})", open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceProperties;
    use std::time::Duration;

    fn device() -> Arc<Device> {
        Device::create(DeviceProperties::default()).unwrap()
    }

    #[tokio::test]
    async fn test_short_read_rejected() {
        let device = device();
        let session = device.open(true).unwrap();
        let mut small = [0u8; 8];
        let result = session.read(&mut small).await;
        assert!(matches!(result, Err(DeviceError::InvalidArgument(_))));
        assert_eq!(result.unwrap_err().errno(), 22);
    }

    #[tokio::test]
    async fn test_nonblocking_session() {
        let device = device();
        let session = device.open(true).unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(session.read(&mut buf).await, Err(DeviceError::WouldBlock));
        assert_eq!(session.poll(), Readiness::NotReady);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocking_session_reads_record() {
        let device = device();
        device.update_config(|c| {
            c.enabled = true;
            c.sampling_ms = 10;
        })
        .await
        .unwrap();

        let session = device.open(false).unwrap();
        // Larger buffers still get exactly one record
        let mut buf = [0u8; 64];
        assert_eq!(session.read(&mut buf).await, Ok(16));
        let sample = Sample::from_bytes(&buf[..16]).unwrap();
        assert_eq!(sample.temp_mc, 25_000);
        assert_eq!(sample.timestamp_ns, 10_000_000);
        device.disable().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_session_count() {
        let device = device();
        let first = device.open(false).unwrap();
        let mut second = device.open(false).unwrap();
        second.set_nonblocking(true);
        assert!(second.is_nonblocking());
        assert_eq!(device.statistics().open_sessions, 2);

        drop(first);
        drop(second);
        assert_eq!(device.statistics().open_sessions, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_session_read() {
        let device = device();
        device.enable().await.unwrap();
        device.flush();

        let session = device.open(false).unwrap();
        let mut buf = [0u8; 16];
        let result = session
            .read_until(&mut buf, tokio::time::sleep(Duration::from_millis(50)))
            .await;
        // First tick lands at 100 ms
        assert_eq!(result, Err(DeviceError::Interrupted));
        device.disable().await.unwrap();
    }
}
