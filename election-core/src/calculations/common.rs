//! Shared numeric helpers for vote calculations.
//!
//! Vote counts are whole numbers. Percentages are [`Decimal`] values rounded
//! half-up to two places, so results are reproducible and free of binary
//! floating-point drift.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use election_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(57.142857)), dec!(57.14));
/// assert_eq!(round_half_up(dec!(57.145)), dec!(57.15));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// `100 * part / whole`, rounded to two places, or zero when `whole` is zero.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use election_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(400, 700), dec!(57.14));
/// assert_eq!(percent_of(400, 0), Decimal::ZERO);
/// ```
pub fn percent_of(
    part: u64,
    whole: u64,
) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    round_half_up(Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole))
}

/// Floors a decimal to a whole vote count. Negative values become zero.
pub fn floor_count(value: Decimal) -> u64 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.floor().to_u64().unwrap_or(u64::MAX)
}

/// Splits `pool` in the ratio `republican_weight : democrat_weight`.
///
/// The Republican share is floored and the Democrat share is the exact
/// complement, so the two always sum to `pool`. Callers must not pass two
/// zero weights.
pub fn split_pool(
    pool: u64,
    republican_weight: Decimal,
    democrat_weight: Decimal,
) -> (u64, u64) {
    let weight = republican_weight + democrat_weight;
    if weight <= Decimal::ZERO {
        return (0, pool);
    }
    let pool_decimal = Decimal::from(pool);
    let share = match pool_decimal.checked_mul(republican_weight) {
        Some(product) => product / weight,
        // Dividing first loses the last digits, so only when the product
        // does not fit.
        None => pool_decimal * (republican_weight / weight),
    };
    let republican = floor_count(share).min(pool);
    (republican, pool - republican)
}

/// Largest count accepted from input data. Far above any real county, and
/// low enough that sums over every county and the products taken while
/// splitting a pool stay in range.
pub const MAX_COUNT: u64 = 10_000_000_000_000;

/// Removes surrounding whitespace and thousands separators.
fn normalize_count_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Coerces text from the data source into a vote or population count.
///
/// Accepts thousands separators and fractional values (truncated). Empty,
/// negative, unparseable or out-of-range (above [`MAX_COUNT`]) input becomes
/// 0; upstream data is known to carry blanks and placeholder text, so this
/// is logged rather than surfaced.
pub fn coerce_count(s: &str) -> u64 {
    let normalized = normalize_count_input(s);
    if normalized.is_empty() {
        return 0;
    }
    let value = match normalized.parse::<u64>() {
        Ok(value) => value,
        Err(_) => match normalized.parse::<Decimal>() {
            Ok(value) => floor_count(value.trunc()),
            Err(e) => {
                tracing::debug!(input = %s, "non-numeric count coerced to 0: {}", e);
                return 0;
            }
        },
    };
    if value > MAX_COUNT {
        tracing::debug!(input = %s, "out-of-range count coerced to 0");
        return 0;
    }
    value
}
