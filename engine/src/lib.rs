pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod mutation;
pub mod scheduler;
pub mod snapshot;
pub mod view;

pub use engine::PriceEngine;
pub use mutation::{IgnoreReason, MutationOutcome, Side};
pub use snapshot::SeriesSnapshot;
