//! Background device feed.
//!
//! Spawns a thread that owns a `DeviceSource`, pushes each reading through
//! `Monitor::ingest` at the device rate, and forwards accepted readings (with
//! their alerts) over a bounded channel. A slow consumer never stalls the
//! device: when the channel is full the forward is dropped and counted, the
//! sample itself is already in the monitor.
//!
//! Each `Feed` owns exactly one thread, joined when the `Feed` is dropped.
use crossbeam_channel as xch;
use exo_traits::clock::Clock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::monitor::{Ingested, Monitor};

/// Forwarded readings held for the consumer before new ones are dropped.
pub const FEED_CHANNEL_CAPACITY: usize = 64;

/// A producer of raw device readings; `None` means the device is done.
pub trait DeviceSource: Send {
    fn next_reading(&mut self) -> Option<Value>;
}

impl<I> DeviceSource for I
where
    I: Iterator<Item = Value> + Send,
{
    fn next_reading(&mut self) -> Option<Value> {
        self.next()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    pub accepted: u64,
    pub rejected: u64,
    /// Accepted readings the consumer never saw because the channel was full.
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct FeedCounters {
    accepted: AtomicU64,
    rejected: AtomicU64,
    dropped: AtomicU64,
}

pub struct Feed {
    rx: xch::Receiver<Ingested>,
    counters: Arc<FeedCounters>,
    finished: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Feed {
    /// Paced feed: one reading every `1/hz` seconds of `clock` time.
    pub fn spawn<S, C>(source: S, monitor: Arc<Monitor>, hz: u32, clock: C) -> Self
    where
        S: DeviceSource + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let period = crate::util::period(hz);
        Self::start(source, monitor, move || clock.sleep(period))
    }

    /// Unpaced feed: readings are ingested as fast as the source yields them.
    pub fn spawn_burst<S>(source: S, monitor: Arc<Monitor>) -> Self
    where
        S: DeviceSource + 'static,
    {
        Self::start(source, monitor, || {})
    }

    fn start<S, P>(mut source: S, monitor: Arc<Monitor>, pace: P) -> Self
    where
        S: DeviceSource + 'static,
        P: Fn() + Send + 'static,
    {
        let (tx, rx) = xch::bounded(FEED_CHANNEL_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(FeedCounters::default());
        let (stop, done, c) = (shutdown.clone(), finished.clone(), counters.clone());

        let join_handle = std::thread::spawn(move || {
            loop {
                if stop.load(Ordering::Relaxed) {
                    tracing::debug!("feed thread received shutdown signal");
                    break;
                }
                let Some(raw) = source.next_reading() else {
                    tracing::debug!("device source exhausted");
                    done.store(true, Ordering::Release);
                    break;
                };
                match monitor.ingest(&raw) {
                    Ok(ingested) => {
                        c.accepted.fetch_add(1, Ordering::Relaxed);
                        match tx.try_send(ingested) {
                            Ok(()) => {}
                            Err(xch::TrySendError::Full(_)) => {
                                c.dropped.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(xch::TrySendError::Disconnected(_)) => {
                                tracing::debug!("feed consumer disconnected, exiting thread");
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        c.rejected.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(error = %e, "device reading rejected");
                    }
                }
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                pace();
            }
            tracing::trace!("feed thread exiting cleanly");
        });

        Self {
            rx,
            counters,
            finished,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Every forwarded reading not yet consumed, oldest first.
    pub fn drain(&self) -> Vec<Ingested> {
        self.rx.try_iter().collect()
    }

    /// True once the source has run dry.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> FeedStats {
        FeedStats {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

impl Drop for Feed {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("feed thread joined"),
                Err(e) => tracing::warn!(?e, "feed thread panicked during shutdown"),
            }
        }
    }
}
