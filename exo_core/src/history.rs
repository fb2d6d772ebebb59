//! Fixed-capacity, insertion-ordered ring of recent samples.
//!
//! Eviction is silent: once full, every append drops the oldest sample. Only
//! the last few minutes are kept live; the durable sink keeps everything.

use exo_traits::SensorSample;
use std::collections::VecDeque;

/// Capacity used by the dashboard (about four minutes of data at 1 Hz polling).
pub const DEFAULT_CAPACITY: usize = 240;
/// Largest capacity accepted by the monitor builder and the config loader.
pub const MAX_CAPACITY: usize = 1_000_000;

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    buf: VecDeque<SensorSample>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryBuffer {
    /// A buffer holding at most `capacity` samples, clamped to `1..=MAX_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_CAPACITY);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, sample: SensorSample) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(sample);
    }

    /// Copy of the buffered samples, oldest first.
    pub fn snapshot(&self) -> Vec<SensorSample> {
        self.buf.iter().copied().collect()
    }

    /// Most recent sample; `None` only before the first append.
    pub fn latest(&self) -> Option<SensorSample> {
        self.buf.back().copied()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
