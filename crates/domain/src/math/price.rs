//! Human-readable price ⇄ Q64.64 sqrt price.
//!
//! Price here is token 1 per token 0 in UI units, i.e. scaled by
//! `10^(decimals_0 - decimals_1)`.

use super::tick_math::{MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64, get_tick_at_sqrt_price};
use crate::error::{QuoteError, Result};
use primitive_types::U512;
use rust_decimal::Decimal;

/// Largest scale a `Decimal` supports.
const MAX_DECIMAL_SCALE: u32 = 28;
/// Mantissa bits available in a `Decimal`.
const DECIMAL_MANTISSA_BITS: usize = 96;
/// Widest mint decimal difference accepted.
const MAX_DECIMAL_SHIFT: i32 = 40;

fn decimal_shift(from: u8, to: u8) -> Result<i32> {
    let shift = i32::from(from) - i32::from(to);
    if shift.abs() > MAX_DECIMAL_SHIFT {
        return Err(QuoteError::out_of_range("decimal difference", shift));
    }
    Ok(shift)
}

/// Converts a sqrt price into a display price.
///
/// The value is exact up to the last representable decimal place: the
/// mantissa is computed on 512-bit integers and the largest fitting scale is
/// used.
///
/// # Errors
/// Returns [`QuoteError::MathOverflow`] if the price does not fit in a `Decimal`
/// and [`QuoteError::OutOfRange`] for implausible decimal differences.
pub fn sqrt_price_x64_to_price(
    sqrt_price_x64: u128,
    decimals_0: u8,
    decimals_1: u8,
) -> Result<Decimal> {
    let squared = U512::from(sqrt_price_x64) * U512::from(sqrt_price_x64);
    let shift = decimal_shift(decimals_0, decimals_1)?;

    for scale in (0..=MAX_DECIMAL_SCALE).rev() {
        let exponent = scale as i32 + shift;
        let (numerator, denominator) = if exponent >= 0 {
            (
                squared * U512::exp10(exponent as usize),
                U512::one() << 128,
            )
        } else {
            (
                squared,
                (U512::one() << 128) * U512::exp10(exponent.unsigned_abs() as usize),
            )
        };
        let mantissa = numerator / denominator;
        if mantissa.bits() <= DECIMAL_MANTISSA_BITS {
            let value = Decimal::try_from_i128_with_scale(mantissa.low_u128() as i128, scale)
                .map_err(|_| QuoteError::MathOverflow("price mantissa"))?;
            return Ok(value.normalize());
        }
    }
    Err(QuoteError::MathOverflow("price exceeds decimal range"))
}

/// Converts a display price into a sqrt price, rounding down.
///
/// # Errors
/// Returns [`QuoteError::OutOfRange`] for non-positive prices or prices
/// outside the pool's sqrt price bound.
pub fn price_to_sqrt_price_x64(price: Decimal, decimals_0: u8, decimals_1: u8) -> Result<u128> {
    if price <= Decimal::ZERO {
        return Err(QuoteError::out_of_range("price", price));
    }
    let mantissa = U512::from(price.mantissa().unsigned_abs());
    // raw = price * 10^(d1 - d0); raw * 2^128 = mantissa * 10^(d1 - d0 - scale) * 2^128
    let exponent = decimal_shift(decimals_1, decimals_0)? - price.scale() as i32;
    let shifted = mantissa << 128;
    let radicand = if exponent >= 0 {
        shifted
            .checked_mul(U512::exp10(exponent as usize))
            .ok_or(QuoteError::MathOverflow("price radicand"))?
    } else {
        shifted / U512::exp10(exponent.unsigned_abs() as usize)
    };

    let root = radicand.integer_sqrt();
    if root.bits() > 128 {
        return Err(QuoteError::out_of_range("price", price));
    }
    let sqrt_price_x64 = root.low_u128();
    if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64) {
        return Err(QuoteError::out_of_range("price", price));
    }
    Ok(sqrt_price_x64)
}

/// Greatest tick whose price does not exceed `price`.
///
/// # Errors
/// Same as [`price_to_sqrt_price_x64`].
pub fn price_to_tick(price: Decimal, decimals_0: u8, decimals_1: u8) -> Result<i32> {
    get_tick_at_sqrt_price(price_to_sqrt_price_x64(price, decimals_0, decimals_1)?)
}
