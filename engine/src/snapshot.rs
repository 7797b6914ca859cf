use serde::Serialize;

use market::{Direction, Label, PricePoint};

/// Read-only copy of the series handed to consumers.
///
/// Owns its data: later ticks and mutations on the engine do not show up here.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesSnapshot {
    pub points: Vec<PricePoint>,
    pub labels: Vec<Label>,

    /// Engine revision this copy was taken at
    pub revision: u64,
}

impl SeriesSnapshot {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<(&PricePoint, &Label)> {
        Some((self.points.last()?, self.labels.last()?))
    }

    pub fn direction(&self, index: usize) -> Option<Direction> {
        Direction::at(&self.points, index)
    }

    /// The newest `n` bars with their labels, oldest first.
    pub fn tail(&self, n: usize) -> SeriesSnapshot {
        let start = self.points.len().saturating_sub(n);
        SeriesSnapshot {
            points: self.points[start..].to_vec(),
            labels: self.labels[start..].to_vec(),
            revision: self.revision,
        }
    }
}
