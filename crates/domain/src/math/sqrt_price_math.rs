//! Next sqrt price after adding or removing a token amount at fixed liquidity.
//!
//! Rounding always favours the pool: token 0 moves round the price up,
//! token 1 moves round it down, so the target price is never overshot.

use super::full_math::{MulDiv, div_rounding_up, u256_to_u128};
use crate::error::{QuoteError, Result};
use primitive_types::U256;

/// `√P' = L·√P / (L ± Δx·√P)`, rounded up.
///
/// # Errors
/// Returns [`QuoteError::MathOverflow`] when removing more token 0 than the
/// range holds or the result leaves `u128`.
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> Result<u128> {
    if amount == 0 {
        return Ok(sqrt_price_x64);
    }
    let numerator_1 = U256::from(liquidity) << 64;
    // u64 * u128 always fits in 256 bits.
    let product = U256::from(amount) * U256::from(sqrt_price_x64);

    let denominator = if add {
        numerator_1 + product
    } else {
        if numerator_1 <= product {
            return Err(QuoteError::MathOverflow("token 0 output exceeds reserves"));
        }
        numerator_1 - product
    };

    numerator_1
        .mul_div_ceil(U256::from(sqrt_price_x64), denominator)
        .and_then(u256_to_u128)
        .ok_or(QuoteError::MathOverflow("next sqrt price from amount 0"))
}

/// `√P' = √P ± Δy / L`, rounded down.
///
/// # Errors
/// Returns [`QuoteError::MathOverflow`] when removing more token 1 than the
/// range holds or the result leaves `u128`.
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> Result<u128> {
    let scaled = U256::from(amount) << 64;
    let liquidity = U256::from(liquidity);
    if add {
        let quotient = u256_to_u128(scaled / liquidity)
            .ok_or(QuoteError::MathOverflow("token 1 input quotient"))?;
        sqrt_price_x64
            .checked_add(quotient)
            .ok_or(QuoteError::MathOverflow("next sqrt price from amount 1"))
    } else {
        let quotient = div_rounding_up(scaled, liquidity)
            .and_then(u256_to_u128)
            .ok_or(QuoteError::MathOverflow("token 1 output quotient"))?;
        if sqrt_price_x64 <= quotient {
            return Err(QuoteError::MathOverflow("token 1 output exceeds reserves"));
        }
        Ok(sqrt_price_x64 - quotient)
    }
}

fn require_positive(sqrt_price_x64: u128, liquidity: u128) -> Result<()> {
    if sqrt_price_x64 == 0 {
        return Err(QuoteError::MathOverflow("zero sqrt price"));
    }
    if liquidity == 0 {
        return Err(QuoteError::MathOverflow("zero liquidity"));
    }
    Ok(())
}

/// Price after `amount_in` of the input token enters the pool.
///
/// # Errors
/// Fails on zero price or liquidity, or when the result is unrepresentable.
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_in: u64,
    zero_for_one: bool,
) -> Result<u128> {
    require_positive(sqrt_price_x64, liquidity)?;
    if zero_for_one {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x64, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x64, liquidity, amount_in, true)
    }
}

/// Price after `amount_out` of the output token leaves the pool.
///
/// # Errors
/// Fails on zero price or liquidity, or when the range cannot supply the amount.
pub fn get_next_sqrt_price_from_output(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_out: u64,
    zero_for_one: bool,
) -> Result<u128> {
    require_positive(sqrt_price_x64, liquidity)?;
    if zero_for_one {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x64, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x64, liquidity, amount_out, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q64: u128 = 1 << 64;

    #[test]
    fn test_zero_amount_is_identity() {
        assert_eq!(
            get_next_sqrt_price_from_amount_0_rounding_up(Q64, 1000, 0, true).unwrap(),
            Q64
        );
        assert_eq!(
            get_next_sqrt_price_from_amount_1_rounding_down(Q64, 1000, 0, true).unwrap(),
            Q64
        );
    }

    #[test]
    fn test_token_1_input_raises_price() {
        // Δy / L = 1000 / 1000 = 1.0 in Q64.
        let next = get_next_sqrt_price_from_input(Q64, 1000, 1000, false).unwrap();
        assert_eq!(next, 2 * Q64);
    }

    #[test]
    fn test_token_0_input_lowers_price() {
        // L·√P / (L + Δx·√P) = 1000 / (1000 + 1000) = 0.5.
        let next = get_next_sqrt_price_from_input(Q64, 1000, 1000, true).unwrap();
        assert_eq!(next, Q64 / 2);
    }

    #[test]
    fn test_output_moves_price_against_trader() {
        let down = get_next_sqrt_price_from_output(Q64, 1000, 500, true).unwrap();
        assert_eq!(down, Q64 / 2);
        let up = get_next_sqrt_price_from_output(Q64, 1000, 500, false).unwrap();
        assert_eq!(up, 2 * Q64);
    }

    #[test]
    fn test_output_beyond_reserves_fails() {
        assert!(get_next_sqrt_price_from_output(Q64, 1000, 1000, false).is_err());
        assert!(get_next_sqrt_price_from_output(Q64, 1000, 1000, true).is_err());
    }

    #[test]
    fn test_zero_liquidity_rejected() {
        assert!(get_next_sqrt_price_from_input(Q64, 0, 1, true).is_err());
        assert!(get_next_sqrt_price_from_output(0, 1, 1, true).is_err());
    }
}
