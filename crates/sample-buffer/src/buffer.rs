//! Sample Buffer Implementation

use simtemp_protocol::Sample;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Default buffer capacity (64 samples)
pub const DEFAULT_CAPACITY: usize = 64;

/// Errors raised by the sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Buffer cannot be created without slots
    #[error("Sample buffer capacity must be non-zero")]
    ZeroCapacity,

    /// Push rejected because every slot holds an unread sample
    #[error("Sample buffer full ({capacity} samples)")]
    Full { capacity: usize },
}

/// Slot arena with a head index and an occupancy count
struct Ring {
    slots: Box<[Sample]>,
    head: usize,
    len: usize,
}

/// Fixed-capacity FIFO of samples.
///
/// All operations take one short, non-suspending lock. A push into a full
/// buffer is rejected and counted as lost; the buffer always holds the
/// oldest unread samples.
pub struct SampleBuffer {
    /// Pre-allocated storage and indices
    ring: Mutex<Ring>,
    /// Capacity of the buffer
    capacity: usize,
    /// Samples rejected because the buffer was full
    lost: AtomicU64,
}

impl SampleBuffer {
    /// Create a new buffer with given capacity
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        Ok(Self::allocate(capacity))
    }

    /// Create a buffer with default capacity (64 samples)
    pub fn with_default_capacity() -> Self {
        Self::allocate(DEFAULT_CAPACITY)
    }

    fn allocate(capacity: usize) -> Self {
        let slots = vec![Sample::default(); capacity].into_boxed_slice();
        Self {
            ring: Mutex::new(Ring {
                slots,
                head: 0,
                len: 0,
            }),
            capacity,
            lost: AtomicU64::new(0),
        }
    }

    // Indices are never left half-updated, poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Ring> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a sample, returning the occupancy after the push.
    ///
    /// A full buffer rejects the sample and increments the lost counter.
    pub fn push(&self, sample: Sample) -> Result<usize, BufferError> {
        let mut ring = self.lock();
        if ring.len == self.capacity {
            drop(ring);
            self.lost.fetch_add(1, Ordering::Relaxed);
            return Err(BufferError::Full {
                capacity: self.capacity,
            });
        }

        let tail = (ring.head + ring.len) % self.capacity;
        ring.slots[tail] = sample;
        ring.len += 1;
        Ok(ring.len)
    }

    /// Remove and return the oldest sample
    pub fn pop(&self) -> Option<Sample> {
        let mut ring = self.lock();
        if ring.len == 0 {
            return None;
        }
        let sample = ring.slots[ring.head];
        ring.head = (ring.head + 1) % self.capacity;
        ring.len -= 1;
        Some(sample)
    }

    /// Get the number of samples currently in the buffer
    pub fn len(&self) -> usize {
        self.lock().len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples rejected since creation or the last reset
    pub fn lost(&self) -> u64 {
        self.lost.load(Ordering::Relaxed)
    }

    /// Zero the lost counter
    pub fn reset_lost(&self) {
        self.lost.store(0, Ordering::Relaxed);
    }

    /// Drop every buffered sample, returning how many were discarded
    pub fn clear(&self) -> usize {
        let mut ring = self.lock();
        let drained = ring.len;
        ring.head = 0;
        ring.len = 0;
        drained
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    fn sample(i: u64) -> Sample {
        Sample::new(i * 1_000_000, 25_000 + i as i32, false)
    }

    #[test]
    fn test_push_and_pop_fifo() {
        let buffer = SampleBuffer::new(10).unwrap();

        for i in 0..5 {
            buffer.push(sample(i)).unwrap();
        }
        assert_eq!(buffer.len(), 5);

        for i in 0..5 {
            assert_eq!(buffer.pop(), Some(sample(i)));
        }
        assert!(buffer.pop().is_none());
    }

    #[test]
    fn test_full_buffer_rejects_newest() {
        let buffer = SampleBuffer::with_default_capacity();

        for i in 0..DEFAULT_CAPACITY as u64 {
            buffer.push(sample(i)).unwrap();
        }
        assert_eq!(buffer.len(), buffer.capacity());

        let result = buffer.push(sample(999));
        assert_eq!(result, Err(BufferError::Full { capacity: 64 }));
        assert_eq!(buffer.len(), DEFAULT_CAPACITY);
        assert_eq!(buffer.lost(), 1);

        // Oldest entry survives
        assert_eq!(buffer.pop(), Some(sample(0)));
    }

    #[test]
    fn test_wraparound() {
        let buffer = SampleBuffer::new(3).unwrap();
        for round in 0..4u64 {
            buffer.push(sample(round * 2)).unwrap();
            buffer.push(sample(round * 2 + 1)).unwrap();
            assert_eq!(buffer.pop(), Some(sample(round * 2)));
            assert_eq!(buffer.pop(), Some(sample(round * 2 + 1)));
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_zero_capacity() {
        assert!(matches!(SampleBuffer::new(0), Err(BufferError::ZeroCapacity)));
    }

    #[test]
    fn test_clear() {
        let buffer = SampleBuffer::new(4).unwrap();
        buffer.push(sample(1)).unwrap();
        assert_eq!(buffer.push(sample(2)), Ok(2));

        assert_eq!(buffer.clear(), 2);
        assert!(buffer.is_empty());
        buffer.push(sample(3)).unwrap();
        assert_eq!(buffer.pop(), Some(sample(3)));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(u64),
        Pop,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![any::<u64>().prop_map(Op::Push), Just(Op::Pop)]
    }

    proptest! {
        #[test]
        fn prop_matches_bounded_queue_model(capacity in 1usize..16, ops in prop::collection::vec(op(), 0..200)) {
            let buffer = SampleBuffer::new(capacity).unwrap();
            let mut model: VecDeque<Sample> = VecDeque::new();
            let mut lost = 0u64;

            for op in ops {
                match op {
                    Op::Push(ts) => {
                        let s = Sample::new(ts, 0, false);
                        if model.len() == capacity {
                            prop_assert!(buffer.push(s).is_err());
                            lost += 1;
                        } else {
                            model.push_back(s);
                            prop_assert_eq!(buffer.push(s).unwrap(), model.len());
                        }
                    }
                    Op::Pop => {
                        prop_assert_eq!(buffer.pop(), model.pop_front());
                    }
                }
                prop_assert!(buffer.len() <= capacity);
            }
            prop_assert_eq!(buffer.lost(), lost);
        }
    }
}
