//! Consumer Interface
//!
//! Blocking and non-blocking reads plus the readiness poll.

use crate::device::Device;
use crate::error::DeviceError;
use simtemp_protocol::{errno, Sample};
use std::future::{pending, Future};
use tracing::debug;

/// How a read behaves on an empty buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Wait for the next sample
    Blocking,
    /// Fail with [`DeviceError::WouldBlock`]
    NonBlocking,
}

impl ReadMode {
    /// Mode for a session's non-blocking flag
    pub fn from_nonblocking(nonblocking: bool) -> Self {
        if nonblocking {
            ReadMode::NonBlocking
        } else {
            ReadMode::Blocking
        }
    }
}

/// Result of a readiness poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

impl Device {
    /// Read one sample.
    ///
    /// A blocking read on an empty buffer waits until a sample arrives or the
    /// device is disabled. It is never interrupted; use
    /// [`Device::read_until`] for that.
    pub async fn read(&self, mode: ReadMode) -> Result<Sample, DeviceError> {
        self.read_until(mode, pending::<()>()).await
    }

    /// Read one sample, giving up with [`DeviceError::Interrupted`] when
    /// `interrupt` completes first.
    pub async fn read_until<F>(&self, mode: ReadMode, interrupt: F) -> Result<Sample, DeviceError>
    where
        F: Future<Output = ()>,
    {
        self.stats.record_read();
        self.ensure_live()?;
        tokio::pin!(interrupt);

        loop {
            // Register before checking the buffer so a push in between is not missed
            let notified = self.notifier.listen();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(sample) = self.buffer.pop() {
                return Ok(sample);
            }
            if self.is_torn_down() {
                return Err(DeviceError::Disabled);
            }
            if mode == ReadMode::NonBlocking {
                return Err(DeviceError::WouldBlock);
            }
            if !self.config.get().enabled {
                return Err(DeviceError::Disabled);
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = &mut interrupt => {
                    debug!("Blocking read interrupted");
                    self.stats.record_error(errno::EINTR);
                    return Err(DeviceError::Interrupted);
                }
            }
        }
    }

    /// Report whether a sample is available without consuming it
    pub fn poll_readiness(&self) -> Readiness {
        self.stats.record_poll();
        if self.buffer.is_empty() {
            Readiness::NotReady
        } else {
            Readiness::Ready
        }
    }

    /// Wait until a sample is available, the device stops producing, or it
    /// is torn down. Returns the readiness at wake-up.
    pub async fn readable(&self) -> Readiness {
        loop {
            let notified = self.notifier.listen();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let readiness = self.poll_readiness();
            if readiness.is_ready() || self.is_torn_down() || !self.config.get().enabled {
                return readiness;
            }
            notified.await;
        }
    }
}
