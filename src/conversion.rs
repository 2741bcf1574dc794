//! Cross-currency arithmetic against a common base currency.
//!
//! Results are rounded to two fractional digits, half away from zero
//! (`1.005 -> 1.01`, `-1.005 -> -1.01`).

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{RateError, Result};

pub const RESULT_SCALE: u32 = 2;

/// Converts `amount` given the rates of both currencies relative to the same base.
///
/// Equivalent to `amount / from_rate * to_rate`, evaluated as
/// `amount * to_rate / from_rate` so only the final division is inexact.
pub fn convert(from_rate: Decimal, to_rate: Decimal, amount: Decimal) -> Result<Decimal> {
    if from_rate <= Decimal::ZERO {
        return Err(RateError::InvalidRate(from_rate));
    }
    if to_rate <= Decimal::ZERO {
        return Err(RateError::InvalidRate(to_rate));
    }

    let result = amount
        .checked_mul(to_rate)
        .and_then(|scaled| scaled.checked_div(from_rate))
        .ok_or(RateError::InvalidAmount(amount))?;

    Ok(round_amount(result))
}

pub fn round_amount(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(RESULT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(RESULT_SCALE);
    rounded
}
