use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct EngineCounters {
    pub ticks_appended: Arc<AtomicU64>,
    // ticks that woke up after cancellation and were dropped
    pub ticks_suppressed: Arc<AtomicU64>,

    pub mutations_applied: Arc<AtomicU64>,
    pub mutations_ignored: Arc<AtomicU64>,

    pub timers_started: Arc<AtomicU64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    pub ticks_appended: u64,
    pub ticks_suppressed: u64,
    pub mutations_applied: u64,
    pub mutations_ignored: u64,
    pub timers_started: u64,
}

impl EngineCounters {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            ticks_appended: self.ticks_appended.load(Ordering::Relaxed),
            ticks_suppressed: self.ticks_suppressed.load(Ordering::Relaxed),
            mutations_applied: self.mutations_applied.load(Ordering::Relaxed),
            mutations_ignored: self.mutations_ignored.load(Ordering::Relaxed),
            timers_started: self.timers_started.load(Ordering::Relaxed),
        }
    }
}
