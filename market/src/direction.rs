use serde::{Deserialize, Serialize};

use crate::types::PricePoint;

/// Up/down colouring of a bar relative to the bar before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `Up` only on a strictly higher close; a flat close counts as `Down`.
    pub fn between(previous_close: f64, close: f64) -> Self {
        if close > previous_close {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// Direction of `points[index]`. The first bar has no predecessor and is
    /// compared with itself. `None` when `index` is out of range.
    pub fn at(points: &[PricePoint], index: usize) -> Option<Self> {
        let current = points.get(index)?.close;
        let previous = match index {
            0 => current,
            i => points[i - 1].close,
        };
        Some(Self::between(previous, current))
    }
}
