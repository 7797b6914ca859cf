use std::fmt;

use serde::{Deserialize, Serialize};

/// One synthetic observation.
///
/// There is no ordering constraint between `open` and `close`; a bar can
/// move in either direction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub open: f64,
    pub close: f64,
}

impl PricePoint {
    pub fn new(open: f64, close: f64) -> Self {
        Self { open, close }
    }

    /// Same bar with only the close replaced.
    pub fn with_close(self, close: f64) -> Self {
        Self {
            open: self.open,
            close,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.close.is_finite()
    }
}

/// Display label (formatted wall-clock time) paired index-for-index with a
/// `PricePoint` in the rolling buffer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(v: impl Into<String>) -> Self {
        Self(v.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
