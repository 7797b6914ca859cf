//! PriceEngine
//!
//! Single owner of the rolling price series.
//! Responsibilities:
//!   • Seed the buffer at construction so it is never empty
//!   • Advance the series on every scheduler tick
//!   • Apply buy/sell adjustments to the newest close
//!   • Hand out isolated snapshots and a revision feed to the view layer
//!
//! Every append and every close rewrite goes through the one `state` mutex,
//! so ticks and mutations are serialized whatever thread they arrive on.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use market::labels::format_label;
use market::{Clock, PricePoint, RandomSource, RandomWalk, RollingBuffer, StdRandom, SystemClock};

use crate::config::{AppConfig, SeriesConfig};
use crate::metrics::{CountersSnapshot, EngineCounters};
use crate::mutation::{IgnoreReason, MutationOutcome, Side, parse_amount};
use crate::scheduler::TickScheduler;
use crate::snapshot::SeriesSnapshot;

struct SeriesState {
    buffer: RollingBuffer,
    rng: Box<dyn RandomSource>,
    revision: u64,

    /// Generation of the timer currently allowed to append; `None` while stopped.
    active_timer: Option<u64>,
    last_generation: u64,
}

pub struct PriceEngine {
    state: Mutex<SeriesState>,
    scheduler: TickScheduler,
    walk: RandomWalk,
    clock: Arc<dyn Clock>,
    revision_tx: watch::Sender<u64>,
    counters: EngineCounters,
}

impl PriceEngine {
    /// Create a seeded engine wrapped in `Arc` so the scheduler task can
    /// hold a weak handle to it.
    pub fn new(
        series: &SeriesConfig,
        mut rng: Box<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let walk = RandomWalk::default();
        let buffer = RollingBuffer::seeded(
            series.capacity,
            series.initial_price,
            series.tick_interval,
            clock.now(),
            &walk,
            &mut *rng,
        );

        debug!(
            capacity = buffer.capacity(),
            last_close = buffer.last().close,
            "series seeded"
        );

        let (revision_tx, _) = watch::channel(0);

        Arc::new(Self {
            state: Mutex::new(SeriesState {
                buffer,
                rng,
                revision: 0,
                active_timer: None,
                last_generation: 0,
            }),
            scheduler: TickScheduler::new(series.tick_interval),
            walk,
            clock,
            revision_tx,
            counters: EngineCounters::default(),
        })
    }

    /// Production wiring: seeded or entropy `StdRng`, wall clock.
    pub fn from_config(cfg: &AppConfig) -> Arc<Self> {
        let rng: Box<dyn RandomSource> = match cfg.seed {
            Some(seed) => Box::new(StdRandom::seeded(seed)),
            None => Box::new(StdRandom::from_entropy()),
        };
        Self::new(&cfg.series, rng, Arc::new(SystemClock))
    }

    /* ---------- Lifecycle ---------- */

    /// Begin ticking. Returns `false` if a timer is already running or no
    /// tokio runtime is available; there is never more than one per engine.
    pub fn start(self: &Arc<Self>) -> bool {
        let started = self.scheduler.start_with(Arc::downgrade(self), || {
            let mut state = self.state.lock();
            state.last_generation += 1;
            state.active_timer = Some(state.last_generation);
            state.last_generation
        });

        if started.is_some() {
            EngineCounters::incr(&self.counters.timers_started);
        }
        started.is_some()
    }

    /// Cancel the timer without touching the buffer. Returns `false` if it
    /// was not running.
    pub fn stop(&self) -> bool {
        self.scheduler
            .cancel_with(|| {
                self.state.lock().active_timer = None;
            })
            .is_some()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn tick_interval(&self) -> Duration {
        self.scheduler.period()
    }

    /* ---------- Series advancement ---------- */

    /// Scheduler entry point. Appends only while `generation` is the armed
    /// timer; otherwise the tick is dropped and `None` returned.
    pub(crate) fn tick(&self, generation: u64) -> Option<PricePoint> {
        let mut state = self.state.lock();

        if state.active_timer != Some(generation) {
            EngineCounters::incr(&self.counters.ticks_suppressed);
            return None;
        }

        Some(self.append_next(&mut state))
    }

    /// Perform one tick immediately, regardless of the timer.
    pub fn advance(&self) -> PricePoint {
        let mut state = self.state.lock();
        self.append_next(&mut state)
    }

    fn append_next(&self, state: &mut SeriesState) -> PricePoint {
        let previous_close = state.buffer.last().close;
        let point = self.walk.generate(previous_close, &mut *state.rng);
        let label = format_label(self.clock.now());

        debug!(
            open = point.open,
            close = point.close,
            label = %label,
            "tick appended"
        );

        state.buffer.append(point, label);
        EngineCounters::incr(&self.counters.ticks_appended);
        self.publish(state);

        point
    }

    /* ---------- Mutations ---------- */

    pub fn buy(&self, amount: f64) -> MutationOutcome {
        self.apply(Side::Buy, amount)
    }

    pub fn sell(&self, amount: f64) -> MutationOutcome {
        self.apply(Side::Sell, amount)
    }

    /// Parse a typed amount and apply it. Unparseable text is ignored like a
    /// non-positive amount but reported as `NotANumber`.
    pub fn apply_input(&self, side: Side, text: &str) -> MutationOutcome {
        match parse_amount(text) {
            Ok(amount) => self.apply(side, amount),
            Err(e) => {
                debug!(?side, error = %e, "mutation ignored");
                EngineCounters::incr(&self.counters.mutations_ignored);
                MutationOutcome::Ignored(IgnoreReason::from(e))
            }
        }
    }

    /// Rewrite the close of the newest bar by `amount / 100`.
    #[instrument(level = "debug", skip(self))]
    pub fn apply(&self, side: Side, amount: f64) -> MutationOutcome {
        let mut state = self.state.lock();
        let previous_close = state.buffer.last().close;

        let close = match side.adjusted_close(previous_close, amount) {
            Ok(close) => close,
            Err(reason) => {
                debug!(?reason, "mutation ignored");
                EngineCounters::incr(&self.counters.mutations_ignored);
                return MutationOutcome::Ignored(reason);
            }
        };

        if !state.buffer.replace_last(close) {
            unreachable!("rolling buffer is seeded at construction and never drained");
        }
        EngineCounters::incr(&self.counters.mutations_applied);
        self.publish(&mut state);

        info!(?side, amount, previous_close, close, "mutation applied");
        MutationOutcome::Applied {
            previous_close,
            close,
        }
    }

    /* ---------- Read side ---------- */

    pub fn snapshot(&self) -> SeriesSnapshot {
        let state = self.state.lock();
        let (points, labels) = state.buffer.snapshot();
        SeriesSnapshot {
            points,
            labels,
            revision: state.revision,
        }
    }

    pub fn last(&self) -> PricePoint {
        self.state.lock().buffer.last()
    }

    /// Revision feed. Bumped after every append and every applied mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    pub fn counters(&self) -> CountersSnapshot {
        self.counters.snapshot()
    }

    fn publish(&self, state: &mut SeriesState) {
        state.revision += 1;
        self.revision_tx.send_replace(state.revision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    use chrono::{Local, TimeZone};
    use market::{FixedClock, FixedSource, SequenceSource};
    use tracing_test::traced_test;

    fn series(capacity: usize) -> SeriesConfig {
        SeriesConfig {
            capacity: NonZeroUsize::new(capacity).unwrap(),
            tick_interval: Duration::from_millis(2_000),
            initial_price: 100.0,
        }
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ))
    }

    /// Midpoint draws keep every seeded bar at 100.0.
    fn flat_engine(capacity: usize) -> Arc<PriceEngine> {
        PriceEngine::new(&series(capacity), Box::new(FixedSource(0.5)), clock())
    }

    #[test]
    fn construction_seeds_full_buffer() {
        let engine = flat_engine(100);
        let snap = engine.snapshot();

        assert_eq!(snap.len(), 100);
        assert_eq!(snap.labels.len(), 100);
        assert_eq!(snap.revision, 0);
        assert_eq!(engine.last(), PricePoint::new(100.0, 100.0));
        assert!(!engine.is_running());
    }

    #[test]
    fn buy_then_sell_scenario() {
        let engine = flat_engine(100);
        let open_before = engine.last().open;

        let out = engine.buy(50.0);
        assert!(out.is_applied());
        assert_eq!(engine.last().close, 100.5);
        assert_eq!(engine.last().open, open_before);

        let out = engine.sell(100.0);
        assert_eq!(
            out,
            MutationOutcome::Applied {
                previous_close: 100.5,
                close: 99.5
            }
        );
        assert_eq!(engine.last().close, 99.5);
        assert_eq!(engine.last().open, open_before);
    }

    #[test]
    fn mutation_leaves_earlier_bars_and_length_alone() {
        let engine = PriceEngine::new(
            &series(10),
            Box::new(SequenceSource::new(vec![0.2, 0.7, 0.9, 0.1])),
            clock(),
        );
        let before = engine.snapshot();

        engine.buy(250.0);

        let after = engine.snapshot();
        assert_eq!(after.len(), before.len());
        assert_eq!(&after.points[..9], &before.points[..9]);
        assert_eq!(after.labels, before.labels);
        assert_eq!(after.revision, before.revision + 1);
    }

    #[test]
    fn non_positive_amounts_are_no_ops() {
        let engine = flat_engine(100);
        let before = engine.snapshot();

        assert_eq!(
            engine.buy(0.0),
            MutationOutcome::Ignored(IgnoreReason::NonPositive)
        );
        assert_eq!(
            engine.buy(-5.0),
            MutationOutcome::Ignored(IgnoreReason::NonPositive)
        );
        assert_eq!(
            engine.sell(f64::NAN),
            MutationOutcome::Ignored(IgnoreReason::NotANumber)
        );

        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.counters().mutations_ignored, 3);
        assert_eq!(engine.counters().mutations_applied, 0);
    }

    #[test]
    fn repeated_huge_buys_keep_close_finite() {
        let engine = flat_engine(5);

        let mut applied = 0;
        for _ in 0..300 {
            if engine.buy(f64::MAX).is_applied() {
                applied += 1;
            }
        }
        assert!(applied > 0);
        assert!(engine.last().is_finite());
        assert_eq!(
            engine.buy(f64::MAX),
            MutationOutcome::Ignored(IgnoreReason::OutOfRange)
        );

        for _ in 0..600 {
            engine.sell(f64::MAX);
        }
        assert!(engine.last().is_finite());
        assert!(engine.snapshot().points.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn start_outside_runtime_is_refused() {
        let engine = flat_engine(5);

        assert!(!engine.start());
        assert!(!engine.is_running());
        assert_eq!(engine.counters().timers_started, 0);
        assert!(engine.state.lock().active_timer.is_none());

        // The refused start left no armed generation behind.
        assert_eq!(engine.tick(1), None);
        assert_eq!(engine.snapshot().revision, 0);
    }

    #[test]
    fn text_input_is_parsed_before_applying() {
        let engine = flat_engine(5);

        assert!(engine.apply_input(Side::Buy, " 50 ").is_applied());
        assert_eq!(engine.last().close, 100.5);

        assert_eq!(
            engine.apply_input(Side::Sell, "abc"),
            MutationOutcome::Ignored(IgnoreReason::NotANumber)
        );
        assert_eq!(engine.last().close, 100.5);
    }

    #[test]
    fn advance_evicts_oldest_and_keeps_length() {
        let engine = PriceEngine::new(
            &series(100),
            Box::new(SequenceSource::new(vec![0.3, 0.8])),
            clock(),
        );
        let before = engine.snapshot();

        let p100 = engine.advance();

        let after = engine.snapshot();
        assert_eq!(after.len(), 100);
        assert_eq!(after.labels.len(), 100);
        assert_eq!(&after.points[..99], &before.points[1..]);
        assert_eq!(after.points[99], p100);
        // the new bar walks from the previous newest close
        let expected_open = before.points[99].close + (0.3 - 0.5) * 20.0;
        assert!((p100.open - expected_open).abs() < 1e-9);
    }

    #[test]
    fn advance_reads_mutated_close() {
        let engine = flat_engine(10);
        engine.buy(300.0);

        let p = engine.advance();

        assert_eq!(p.open, 103.0);
        assert_eq!(p.close, 103.0);
    }

    #[test]
    fn snapshot_does_not_track_later_changes() {
        let engine = flat_engine(3);
        let snap = engine.snapshot();

        engine.advance();
        engine.buy(1_000.0);

        assert_eq!(snap.points, vec![PricePoint::new(100.0, 100.0); 3]);
        assert_eq!(snap.revision, 0);
    }

    #[test]
    fn subscribers_see_revision_bumps() {
        let engine = flat_engine(3);
        let mut rx = engine.subscribe();

        engine.advance();
        engine.buy(1.0);
        engine.buy(-1.0);

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 2);
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        let engine = flat_engine(3);
        assert!(!engine.stop());
    }

    #[test]
    fn revoked_generation_cannot_append() {
        let engine = flat_engine(3);
        let before = engine.snapshot();

        assert!(engine.tick(1).is_none());

        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.counters().ticks_suppressed, 1);
    }

    #[test]
    #[traced_test]
    fn ignored_mutation_is_logged() {
        let engine = flat_engine(3);
        engine.buy(0.0);

        assert!(logs_contain("mutation ignored"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use std::num::NonZeroUsize;

    use market::{FixedClock, FixedSource};
    use proptest::prelude::*;

    fn engine() -> Arc<PriceEngine> {
        let series = SeriesConfig {
            capacity: NonZeroUsize::new(10).unwrap(),
            tick_interval: Duration::from_millis(2_000),
            initial_price: 100.0,
        };
        let clock = FixedClock(chrono::Local::now());
        PriceEngine::new(&series, Box::new(FixedSource(0.5)), Arc::new(clock))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn mutations_only_move_newest_close(
            amounts in prop::collection::vec(-500.0..500.0f64, 1..50)
        ) {
            let engine = engine();
            let before = engine.snapshot();
            let mut expected = before.points[9].close;

            for (i, amount) in amounts.iter().enumerate() {
                let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                let out = engine.apply(side, *amount);

                if *amount > 0.0 {
                    expected = side.adjusted_close(expected, *amount).unwrap();
                    prop_assert!(out.is_applied());
                } else {
                    prop_assert_eq!(out, MutationOutcome::Ignored(IgnoreReason::NonPositive));
                }
            }

            let after = engine.snapshot();
            prop_assert_eq!(after.len(), 10);
            prop_assert_eq!(&after.points[..9], &before.points[..9]);
            prop_assert_eq!(after.points[9].open, before.points[9].open);
            prop_assert_eq!(after.points[9].close, expected);
            prop_assert_eq!(after.labels, before.labels);
        }
    }
}
