use crate::random::RandomSource;
use crate::types::PricePoint;

/// Width of the uniform jump applied to the previous close to get `open`.
pub const DEFAULT_OPEN_RANGE: f64 = 20.0;

/// Width of the uniform jump applied to `open` to get `close`.
pub const DEFAULT_CLOSE_RANGE: f64 = 30.0;

/// Random-walk bar generator.
///
/// `open  = prev_close + (u1 - 0.5) * open_range`
/// `close = open       + (u2 - 0.5) * close_range`
#[derive(Clone, Copy, Debug)]
pub struct RandomWalk {
    open_range: f64,
    close_range: f64,
}

impl Default for RandomWalk {
    fn default() -> Self {
        Self {
            open_range: DEFAULT_OPEN_RANGE,
            close_range: DEFAULT_CLOSE_RANGE,
        }
    }
}

impl RandomWalk {
    /// Produce the next bar from the previous close. Consumes exactly two draws.
    pub fn generate(&self, previous_close: f64, src: &mut dyn RandomSource) -> PricePoint {
        let open = previous_close + (src.next_unit() - 0.5) * self.open_range;
        let close = open + (src.next_unit() - 0.5) * self.close_range;
        PricePoint { open, close }
    }

    /// Chain `count` bars starting from `initial_price`, each seeded by the
    /// close of the one before it.
    pub fn chain(
        &self,
        initial_price: f64,
        count: usize,
        src: &mut dyn RandomSource,
    ) -> Vec<PricePoint> {
        let mut out = Vec::with_capacity(count);
        let mut prev = initial_price;
        for _ in 0..count {
            let p = self.generate(prev, src);
            prev = p.close;
            out.push(p);
        }
        out
    }
}
