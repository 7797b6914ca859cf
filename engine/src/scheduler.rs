//! Periodic tick scheduler.
//!
//! One tokio task per running timer. The task holds only a `Weak` to the
//! engine and re-reads the live buffer on every firing, so it never works
//! from a stale copy of the series.
//!
//! Cancellation is two-sided:
//!   • the engine clears the timer's generation under the buffer lock, so a
//!     tick that wakes later is suppressed before it can append
//!   • the task itself is aborted so it stops waking up at all

use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{Instrument, debug, info, warn};

use crate::engine::PriceEngine;

struct ActiveTimer {
    generation: u64,
    task: JoinHandle<()>,
}

/// Owns at most one live ticker task.
pub struct TickScheduler {
    period: Duration,
    slot: Mutex<Option<ActiveTimer>>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            // interval_at panics on a zero period
            period: period.max(Duration::from_millis(1)),
            slot: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|t| !t.task.is_finished())
    }

    /// Spawn a ticker unless one is already live.
    ///
    /// `arm` runs while the slot is locked and returns the generation the
    /// new ticker must present on every firing. Returns that generation, or
    /// `None` when a ticker was already running or there is no tokio runtime
    /// to spawn on. `arm` is not called in either case.
    pub(crate) fn start_with(
        &self,
        engine: Weak<PriceEngine>,
        arm: impl FnOnce() -> u64,
    ) -> Option<u64> {
        let mut slot = self.slot.lock();

        if slot.as_ref().is_some_and(|t| !t.task.is_finished()) {
            debug!("tick scheduler already running; start ignored");
            return None;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!("no tokio runtime; tick scheduler not started");
            return None;
        };

        let generation = arm();
        let span = tracing::info_span!("tick_scheduler", generation);
        let task = runtime.spawn(run_ticker(engine, generation, self.period).instrument(span));

        *slot = Some(ActiveTimer { generation, task });

        info!(
            generation,
            every_ms = self.period.as_millis() as u64,
            "tick scheduler started"
        );
        Some(generation)
    }

    /// Cancel the live ticker, if any.
    ///
    /// `disarm` runs before the task is aborted and must revoke the
    /// generation under the buffer lock. Once this returns no further tick
    /// from the cancelled timer can append.
    pub(crate) fn cancel_with(&self, disarm: impl FnOnce()) -> Option<u64> {
        let mut slot = self.slot.lock();
        let timer = slot.take()?;

        disarm();
        timer.task.abort();

        info!(generation = timer.generation, "tick scheduler stopped");
        Some(timer.generation)
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.slot.get_mut().take() {
            timer.task.abort();
        }
    }
}

async fn run_ticker(engine: Weak<PriceEngine>, generation: u64, period: Duration) {
    // First firing one full period after start, like setInterval.
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let Some(engine) = engine.upgrade() else {
            debug!("engine dropped; ticker exiting");
            break;
        };

        if engine.tick(generation).is_none() {
            debug!("generation revoked; ticker exiting");
            break;
        }
    }
}
