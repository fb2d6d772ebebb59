use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall-clock abstraction used to stamp samples and notes.
///
/// - now_ms(): milliseconds since the Unix epoch
/// - sleep(): sleeps for the provided duration (implementations may simulate)
pub trait Clock {
    fn now_ms(&self) -> i64;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `earlier_ms`, saturating at 0 when the clock
    /// has stepped backwards.
    fn ms_since(&self, earlier_ms: i64) -> u64 {
        let delta = self.now_ms().saturating_sub(earlier_ms);
        u64::try_from(delta).unwrap_or(0)
    }
}

/// Default clock backed by `SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Deterministic clock whose time is set by hand.
///
/// now_ms() = origin + offset
/// sleep(d) advances internal time by d without actually sleeping.
/// Clones share the same time source.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin_ms: i64,
    offset_ms: Arc<Mutex<i64>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ManualClock {
    pub fn new(origin_ms: i64) -> Self {
        Self {
            origin_ms,
            offset_ms: Arc::new(Mutex::new(0)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, d: Duration) {
        let step = i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
        if let Ok(mut off) = self.offset_ms.lock() {
            *off = off.saturating_add(step);
        }
    }

    /// Set the offset relative to origin. Negative offsets model a wall clock
    /// that was stepped backwards.
    pub fn set_offset_ms(&self, offset: i64) {
        if let Ok(mut off) = self.offset_ms.lock() {
            *off = offset;
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        let off = self.offset_ms.lock().map(|g| *g).unwrap_or(0);
        self.origin_ms.saturating_add(off)
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}
