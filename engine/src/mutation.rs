//! Buy/sell adjustments of the newest close.
//!
//! A mutation rewrites the close of the last bar by `amount / 100`. It never
//! appends, never evicts and never touches `open`.

use serde::Serialize;

use crate::error::AmountError;

/// Divisor turning an entered amount into a price delta.
pub const AMOUNT_SCALE: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Why a mutation left the series untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum IgnoreReason {
    /// Amount was zero or negative.
    NonPositive,
    /// Amount was NaN, infinite, or unparseable text.
    NotANumber,
    /// Amount was valid but the new close would overflow to infinity.
    OutOfRange,
}

/// Result of a buy/sell call. The caller resets its input on `Applied`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum MutationOutcome {
    Applied { previous_close: f64, close: f64 },
    Ignored(IgnoreReason),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied { .. })
    }
}

impl From<AmountError> for IgnoreReason {
    fn from(_: AmountError) -> Self {
        IgnoreReason::NotANumber
    }
}

impl Side {
    /// New close for the newest bar, or the reason the amount is refused.
    pub fn adjusted_close(self, last_close: f64, amount: f64) -> Result<f64, IgnoreReason> {
        if !amount.is_finite() {
            return Err(IgnoreReason::NotANumber);
        }
        if amount <= 0.0 {
            return Err(IgnoreReason::NonPositive);
        }

        let delta = amount / AMOUNT_SCALE;
        let close = match self {
            Side::Buy => last_close + delta,
            Side::Sell => last_close - delta,
        };
        if !close.is_finite() {
            return Err(IgnoreReason::OutOfRange);
        }
        Ok(close)
    }
}

/// Parse a user-entered amount. Sign is not checked here.
pub fn parse_amount(text: &str) -> Result<f64, AmountError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| AmountError::NotANumber(trimmed.to_string()))?;

    if !value.is_finite() {
        return Err(AmountError::NotFinite(value));
    }
    Ok(value)
}
