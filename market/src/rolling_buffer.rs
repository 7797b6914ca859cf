use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::labels::seed_labels;
use crate::random::RandomSource;
use crate::types::{Label, PricePoint};
use crate::walk::RandomWalk;

pub const DEFAULT_CAPACITY: usize = 100;

/// Fixed-capacity series of bars with a parallel label sequence.
///
/// Invariants:
///   • `points.len() == labels.len()`
///   • `points.len() <= capacity`
///   • never empty (constructed seeded)
///
/// Appending at capacity evicts the oldest entry first (FIFO).
#[derive(Clone, Debug)]
pub struct RollingBuffer {
    /// Bars ordered oldest → newest
    points: VecDeque<PricePoint>,

    /// Labels, same index as `points`
    labels: VecDeque<Label>,

    capacity: usize,
}

impl RollingBuffer {
    /// Fill a new buffer to capacity by chaining the walk from `initial_price`.
    /// Labels end at `now` and step back by `interval`.
    pub fn seeded(
        capacity: NonZeroUsize,
        initial_price: f64,
        interval: Duration,
        now: DateTime<Local>,
        walk: &RandomWalk,
        src: &mut dyn RandomSource,
    ) -> Self {
        let capacity = capacity.get();
        let points = walk.chain(initial_price, capacity, src);
        let labels = seed_labels(now, capacity, interval);

        Self {
            points: points.into(),
            labels: labels.into(),
            capacity,
        }
    }

    /// Build from explicit contents. Returns `None` when the sequences are
    /// empty, differ in length, or exceed `capacity`.
    pub fn from_parts(
        capacity: NonZeroUsize,
        points: Vec<PricePoint>,
        labels: Vec<Label>,
    ) -> Option<Self> {
        let capacity = capacity.get();
        if points.is_empty() || points.len() != labels.len() || points.len() > capacity {
            return None;
        }

        Some(Self {
            points: points.into(),
            labels: labels.into(),
            capacity,
        })
    }

    /// Push a bar and its label, evicting the oldest pair first when full.
    pub fn append(&mut self, point: PricePoint, label: Label) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
            self.labels.pop_front();
        }

        self.points.push_back(point);
        self.labels.push_back(label);
    }

    /// Overwrite the close of the newest bar; its open is kept.
    /// Returns `false` (no-op) on an empty buffer.
    pub fn replace_last(&mut self, close: f64) -> bool {
        match self.points.back_mut() {
            Some(last) => {
                *last = last.with_close(close);
                true
            }
            None => false,
        }
    }

    /// Newest bar.
    ///
    /// Panics if the buffer is empty, which construction rules out.
    pub fn last(&self) -> PricePoint {
        match self.points.back() {
            Some(p) => *p,
            None => unreachable!("rolling buffer is seeded at construction and never drained"),
        }
    }

    pub fn last_label(&self) -> Option<&Label> {
        self.labels.back()
    }

    /// Owned copies of both sequences. Later mutation of the buffer does not
    /// affect a returned snapshot.
    pub fn snapshot(&self) -> (Vec<PricePoint>, Vec<Label>) {
        (
            self.points.iter().copied().collect(),
            self.labels.iter().cloned().collect(),
        )
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = &PricePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
