//! Wall-clock labels for the series.
//!
//! Seed labels and runtime tick labels go through the same formatter so the
//! whole series shares one format.

use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};

use crate::types::Label;

/// Display format of every label (local time, 24h).
pub const LABEL_FORMAT: &str = "%H:%M:%S";

/// Source of "now" for label generation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

pub fn format_label(at: DateTime<Local>) -> Label {
    Label::new(at.format(LABEL_FORMAT).to_string())
}

/// `count` labels ending at `now`, spaced `interval` apart, oldest first.
///
/// The oldest label is `now - (count - 1) * interval`.
pub fn seed_labels(now: DateTime<Local>, count: usize, interval: Duration) -> Vec<Label> {
    let step = TimeDelta::from_std(interval).unwrap_or(TimeDelta::zero());

    (0..count)
        .rev()
        .map(|back| {
            let offset = step
                .checked_mul(back as i32)
                .unwrap_or(TimeDelta::zero());
            format_label(now - offset)
        })
        .collect()
}
