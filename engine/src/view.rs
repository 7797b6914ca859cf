//! Presentation seam.
//!
//! Views never hold the buffer. They poll the engine's revision feed and
//! render an owned snapshot when it has moved.

use std::sync::Weak;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use market::{Direction, PricePoint};

use crate::engine::PriceEngine;
use crate::snapshot::SeriesSnapshot;

pub trait SeriesView: Send {
    fn render(&mut self, snapshot: &SeriesSnapshot);
}

/// Tooltip text of one bar, two decimals.
pub fn bar_tooltip(point: &PricePoint) -> [String; 2] {
    [
        format!("Open: ${:.2}", point.open),
        format!("Close: ${:.2}", point.close),
    ]
}

/// Renders the newest bar through `tracing`, plus a JSON tail at debug level.
pub struct LogView {
    tail: usize,
    rendered: u64,
}

impl LogView {
    pub fn new(tail: usize) -> Self {
        Self { tail, rendered: 0 }
    }

    pub fn rendered(&self) -> u64 {
        self.rendered
    }
}

impl SeriesView for LogView {
    fn render(&mut self, snapshot: &SeriesSnapshot) {
        let Some((point, label)) = snapshot.last() else {
            warn!("empty snapshot; nothing to render");
            return;
        };

        let direction = snapshot
            .direction(snapshot.len() - 1)
            .unwrap_or(Direction::Down);
        let [open, close] = bar_tooltip(point);

        info!(
            revision = snapshot.revision,
            label = %label,
            ?direction,
            "{open} {close}"
        );

        match serde_json::to_string(&snapshot.tail(self.tail)) {
            Ok(json) => debug!(tail = %json, "series tail"),
            Err(e) => warn!(error = %e, "failed to encode series tail"),
        }

        self.rendered += 1;
    }
}

/// Poll the engine every `every` and render when the revision changed.
/// Exits when the engine is dropped.
pub async fn run_view<V: SeriesView>(
    engine: Weak<PriceEngine>,
    mut view: V,
    every: Duration,
) -> V {
    let Some(mut rx) = engine.upgrade().map(|e| e.subscribe()) else {
        return view;
    };

    // Render the seeded series once up front.
    rx.mark_changed();

    let mut ticker = interval(every.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match rx.has_changed() {
            Ok(true) => {}
            Ok(false) => continue,
            Err(_) => break,
        }
        rx.borrow_and_update();

        let Some(live) = engine.upgrade() else {
            break;
        };
        view.render(&live.snapshot());
    }

    debug!("view loop exiting");
    view
}
