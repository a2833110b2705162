//! Currency helpers.
//!
//! Amounts are whole currency units held in `i64`; rates are
//! [`Decimal`]s.  Every premium and tax line is floored to a multiple
//! of ten as soon as it is computed, before it is added to anything
//! else.  Flooring once at the end gives different totals.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Floors a value to the nearest lower multiple of 10.
pub fn floor_to_10(value: Decimal) -> i64 {
    let tens = (value / Decimal::TEN).floor();
    to_units(tens).saturating_mul(10)
}

/// Drops the fractional part of a non-negative amount.
pub fn truncate(value: Decimal) -> i64 {
    to_units(value.floor())
}

/// Conventional rounding: halves go away from zero.
pub fn round_half_up(value: Decimal) -> i64 {
    to_units(value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// Clamps malformed negative input to zero.
pub fn non_negative(amount: i64) -> i64 {
    amount.max(0)
}

pub fn dec(amount: i64) -> Decimal {
    Decimal::from(amount)
}

fn to_units(value: Decimal) -> i64 {
    value.to_i64().unwrap_or(if value.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}
