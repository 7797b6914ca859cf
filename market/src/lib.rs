//! Synthetic price-series data layer.
//!
//! Everything in this crate is synchronous and free of IO: the price
//! model, the random-walk generator, the bounded rolling buffer and the
//! label clock. Ownership and scheduling live in the `engine` crate.

pub mod direction;
pub mod labels;
pub mod random;
pub mod rolling_buffer;
pub mod types;
pub mod walk;

pub use direction::Direction;
pub use labels::{Clock, FixedClock, SystemClock};
pub use random::{FixedSource, RandomSource, SequenceSource, StdRandom};
pub use rolling_buffer::RollingBuffer;
pub use types::{Label, PricePoint};
pub use walk::RandomWalk;
