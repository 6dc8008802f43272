//! Session and Statistics Tracker

use metrics::counter;
use sample_buffer::SampleBuffer;
use serde::Serialize;
use simtemp_protocol::StatsRecord;
use std::fmt;
use std::sync::atomic::{AtomicI32, AtomicI64, AtomicU64, Ordering};

/// Cumulative device counters.
///
/// The lost-sample counter lives in the [`SampleBuffer`]; snapshots and
/// resets cover both.
#[derive(Debug, Default)]
pub struct Statistics {
    updates: AtomicU64,
    alerts: AtomicU64,
    read_calls: AtomicU64,
    poll_calls: AtomicU64,
    last_error: AtomicI32,
    open_sessions: AtomicI64,
}

/// Point-in-time copy of the statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub updates: u64,
    pub alerts: u64,
    pub lost: u64,
    pub read_calls: u64,
    pub poll_calls: u64,
    pub last_error: i32,
    pub buffer_usage: usize,
    pub buffer_capacity: usize,
    pub open_sessions: i64,
}

impl Statistics {
    /// Create zeroed statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// A sample was buffered
    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
        counter!("simtemp_samples_produced_total").increment(1);
    }

    /// A buffered sample crossed the threshold
    pub fn record_alert(&self) {
        self.alerts.fetch_add(1, Ordering::Relaxed);
        counter!("simtemp_threshold_alerts_total").increment(1);
    }

    /// A sample was dropped on a full buffer
    pub fn record_overflow(&self, code: i32) {
        self.record_error(code);
        counter!("simtemp_samples_lost_total").increment(1);
    }

    /// A consumer called read
    pub fn record_read(&self) {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
        counter!("simtemp_read_calls_total").increment(1);
    }

    /// A consumer polled for readiness
    pub fn record_poll(&self) {
        self.poll_calls.fetch_add(1, Ordering::Relaxed);
        counter!("simtemp_poll_calls_total").increment(1);
    }

    /// Remember the most recent error (stored negated, errno style)
    pub fn record_error(&self, code: i32) {
        self.last_error.store(-code.abs(), Ordering::Relaxed);
    }

    /// A byte-stream session was opened
    pub fn session_opened(&self) -> i64 {
        self.open_sessions.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// A byte-stream session was closed
    pub fn session_closed(&self) -> i64 {
        self.open_sessions.fetch_sub(1, Ordering::Relaxed) - 1
    }

    /// Currently open sessions
    pub fn open_sessions(&self) -> i64 {
        self.open_sessions.load(Ordering::Relaxed)
    }

    /// Zero every counter, including the buffer's lost counter.
    ///
    /// The open-session count is not a statistic and is left alone.
    pub fn reset(&self, buffer: &SampleBuffer) {
        self.updates.store(0, Ordering::Relaxed);
        self.alerts.store(0, Ordering::Relaxed);
        self.read_calls.store(0, Ordering::Relaxed);
        self.poll_calls.store(0, Ordering::Relaxed);
        self.last_error.store(0, Ordering::Relaxed);
        buffer.reset_lost();
    }

    /// Take a snapshot together with the buffer's counters
    pub fn snapshot(&self, buffer: &SampleBuffer) -> StatsSnapshot {
        StatsSnapshot {
            updates: self.updates.load(Ordering::Relaxed),
            alerts: self.alerts.load(Ordering::Relaxed),
            lost: buffer.lost(),
            read_calls: self.read_calls.load(Ordering::Relaxed),
            poll_calls: self.poll_calls.load(Ordering::Relaxed),
            last_error: self.last_error.load(Ordering::Relaxed),
            buffer_usage: buffer.len(),
            buffer_capacity: buffer.capacity(),
            open_sessions: self.open_sessions(),
        }
    }
}

impl StatsSnapshot {
    /// Structured record for the control-command interface
    pub fn to_record(&self) -> StatsRecord {
        StatsRecord {
            updates: self.updates,
            alerts: self.alerts,
            lost: self.lost,
            read_calls: self.read_calls,
            poll_calls: self.poll_calls,
            last_error: self.last_error,
            buffer_usage: u32::try_from(self.buffer_usage).unwrap_or(u32::MAX),
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "updates={}", self.updates)?;
        writeln!(f, "alerts={}", self.alerts)?;
        writeln!(f, "lost={}", self.lost)?;
        writeln!(f, "read_calls={}", self.read_calls)?;
        writeln!(f, "poll_calls={}", self.poll_calls)?;
        writeln!(f, "last_error={}", self.last_error)?;
        writeln!(f, "buffer_usage={}/{}", self.buffer_usage, self.buffer_capacity)?;
        writeln!(f, "open_sessions={}", self.open_sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtemp_protocol::{errno, Sample};

    #[test]
    fn test_snapshot_and_reset() {
        let stats = Statistics::new();
        let buffer = SampleBuffer::new(1).unwrap();

        stats.record_update();
        stats.record_alert();
        stats.record_read();
        stats.record_poll();
        buffer.push(Sample::default()).unwrap();
        assert!(buffer.push(Sample::default()).is_err());
        stats.record_overflow(errno::EOVERFLOW);
        stats.session_opened();

        let snapshot = stats.snapshot(&buffer);
        assert_eq!(snapshot.updates, 1);
        assert_eq!(snapshot.alerts, 1);
        assert_eq!(snapshot.lost, 1);
        assert_eq!(snapshot.last_error, -75);
        assert_eq!(snapshot.buffer_usage, 1);
        assert_eq!(snapshot.open_sessions, 1);

        stats.reset(&buffer);
        let snapshot = stats.snapshot(&buffer);
        assert_eq!(snapshot.updates, 0);
        assert_eq!(snapshot.lost, 0);
        assert_eq!(snapshot.last_error, 0);
        assert_eq!(snapshot.open_sessions, 1);
    }

    #[test]
    fn test_text_dump() {
        let snapshot = StatsSnapshot {
            updates: 5,
            alerts: 1,
            buffer_usage: 3,
            buffer_capacity: 64,
            ..Default::default()
        };
        let text = snapshot.to_string();
        assert!(text.starts_with("updates=5\nalerts=1\n"));
        assert!(text.contains("buffer_usage=3/64\n"));
        assert_eq!(snapshot.to_record().buffer_usage, 3);
    }
}
