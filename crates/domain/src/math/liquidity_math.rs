//! Token amounts spanned by a liquidity position between two sqrt prices.

use super::full_math::{MulDiv, div_rounding_up, q64, u256_to_u64};
use crate::error::{QuoteError, Result};
use primitive_types::U256;

/// Applies a signed liquidity delta.
///
/// # Errors
/// Returns [`QuoteError::InconsistentState`] when the result would leave the
/// `u128` range, which only happens with corrupt tick data.
pub fn add_delta(liquidity: u128, delta: i128) -> Result<u128> {
    let next = if delta < 0 {
        liquidity.checked_sub(delta.unsigned_abs())
    } else {
        liquidity.checked_add(delta.unsigned_abs())
    };
    next.ok_or_else(|| {
        QuoteError::InconsistentState(format!(
            "liquidity {liquidity} cannot absorb net delta {delta}"
        ))
    })
}

fn ordered(a: u128, b: u128) -> (u128, u128) {
    if a > b { (b, a) } else { (a, b) }
}

/// Amount of token 0 between two prices at full width:
/// `L * (√Pb - √Pa) / (√Pa * √Pb)`.
///
/// # Errors
/// Returns [`QuoteError::MathOverflow`] if either price is zero.
pub fn get_delta_amount_0_wide(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<U256> {
    let (lower, upper) = ordered(sqrt_price_a_x64, sqrt_price_b_x64);
    if lower == 0 {
        return Err(QuoteError::MathOverflow("zero sqrt price in amount 0"));
    }
    let numerator_1 = U256::from(liquidity) << 64;
    let numerator_2 = U256::from(upper - lower);
    let (lower, upper) = (U256::from(lower), U256::from(upper));

    let amount = if round_up {
        numerator_1
            .mul_div_ceil(numerator_2, upper)
            .and_then(|v| div_rounding_up(v, lower))
    } else {
        numerator_1.mul_div_floor(numerator_2, upper).map(|v| v / lower)
    };
    amount.ok_or(QuoteError::MathOverflow("amount 0"))
}

/// Amount of token 1 between two prices at full width: `L * (√Pb - √Pa)`.
///
/// # Errors
/// Returns [`QuoteError::MathOverflow`] if the product cannot be represented.
pub fn get_delta_amount_1_wide(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<U256> {
    let (lower, upper) = ordered(sqrt_price_a_x64, sqrt_price_b_x64);
    let liquidity = U256::from(liquidity);
    let diff = U256::from(upper - lower);
    let amount = if round_up {
        liquidity.mul_div_ceil(diff, q64())
    } else {
        liquidity.mul_div_floor(diff, q64())
    };
    amount.ok_or(QuoteError::MathOverflow("amount 1"))
}

/// [`get_delta_amount_0_wide`] narrowed to a token amount.
///
/// # Errors
/// Returns [`QuoteError::MathOverflow`] when the amount exceeds `u64::MAX`.
pub fn get_delta_amount_0_unsigned(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64> {
    let wide = get_delta_amount_0_wide(sqrt_price_a_x64, sqrt_price_b_x64, liquidity, round_up)?;
    u256_to_u64(wide).ok_or(QuoteError::MathOverflow("amount 0 exceeds u64"))
}

/// [`get_delta_amount_1_wide`] narrowed to a token amount.
///
/// # Errors
/// Returns [`QuoteError::MathOverflow`] when the amount exceeds `u64::MAX`.
pub fn get_delta_amount_1_unsigned(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64> {
    let wide = get_delta_amount_1_wide(sqrt_price_a_x64, sqrt_price_b_x64, liquidity, round_up)?;
    u256_to_u64(wide).ok_or(QuoteError::MathOverflow("amount 1 exceeds u64"))
}
