//! Entropy seam for the random walk.
//!
//! The generator only needs uniform draws in `[0, 1)`. Production uses a
//! `StdRng`; tests and demos plug in deterministic sources.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform `[0, 1)` draws. Assumed infallible.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

/// `StdRng`-backed source, either OS-seeded or seeded for reproducible runs.
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Always returns the same draw. `FixedSource(0.5)` makes every step zero.
#[derive(Clone, Copy, Debug)]
pub struct FixedSource(pub f64);

impl RandomSource for FixedSource {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
#[derive(Clone, Debug)]
pub struct SequenceSource {
    draws: Vec<f64>,
    pos: usize,
}

impl SequenceSource {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, pos: 0 }
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.5;
        }
        let v = self.draws[self.pos % self.draws.len()];
        self.pos = (self.pos + 1) % self.draws.len();
        v
    }
}
