//! Tick index ⇄ Q64.64 square-root price conversion.
//!
//! Both directions reproduce the on-chain integer algorithm bit for bit:
//! the forward direction multiplies precomputed `sqrt(1.0001^-2^i)` factors,
//! the inverse extracts a base-2 logarithm by repeated squaring and then
//! disambiguates between two candidate ticks.

use crate::error::{QuoteError, Result};

/// Lowest tick a pool can reach.
pub const MIN_TICK: i32 = -443636;
/// Highest tick a pool can reach.
pub const MAX_TICK: i32 = -MIN_TICK;

/// `get_sqrt_price_at_tick(MIN_TICK)`.
pub const MIN_SQRT_PRICE_X64: u128 = 4295048016;
/// `get_sqrt_price_at_tick(MAX_TICK)`.
pub const MAX_SQRT_PRICE_X64: u128 = 79226673521066979257578248091;

/// `log_sqrt(1.0001)(2)` in Q32.
const LOG_B_2_X32: i128 = 59543866431248;
/// Fractional bits extracted by the squaring loop.
const BIT_PRECISION: u32 = 16;
const LOG_B_P_ERR_MARGIN_LOWER_X64: i128 = 184467440737095516;
const LOG_B_P_ERR_MARGIN_UPPER_X64: i128 = 15793534762490258745;

/// `2^64 / sqrt(1.0001^(2^i))` for i = 1..=18, applied when bit i of |tick| is set.
const TICK_RATIO_FACTORS: [u128; 18] = [
    18444899583751176192,
    18443055278223355904,
    18439367220385607680,
    18431993317065453568,
    18417254355718170624,
    18387811781193609216,
    18329067761203558400,
    18212142134806163456,
    17980523815641700352,
    17526086738831433728,
    16651378430235570176,
    15030750278694412288,
    12247334978884435968,
    8131365268886854656,
    3584323654725218816,
    696457651848324352,
    26294789957507116,
    37481735321082,
];

/// Returns `sqrt(1.0001^tick)` as a Q64.64 fixed-point number.
///
/// # Errors
/// Returns [`QuoteError::OutOfRange`] when `tick` lies outside
/// `MIN_TICK..=MAX_TICK`.
pub fn get_sqrt_price_at_tick(tick: i32) -> Result<u128> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(QuoteError::out_of_range("tick", tick));
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio: u128 = if abs_tick & 0x1 != 0 {
        18445821805675395072
    } else {
        1u128 << 64
    };
    // ratio never exceeds 2^64 and each factor is below 2^64, so the product fits.
    for (bit, factor) in TICK_RATIO_FACTORS.iter().enumerate() {
        if abs_tick & (0x2 << bit) != 0 {
            ratio = (ratio * factor) >> 64;
        }
    }

    if tick > 0 {
        ratio = u128::MAX / ratio;
    }
    Ok(ratio)
}

/// Returns the greatest tick whose sqrt price does not exceed `sqrt_price_x64`.
///
/// # Errors
/// Returns [`QuoteError::OutOfRange`] when the price lies outside
/// `MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64`.
pub fn get_tick_at_sqrt_price(sqrt_price_x64: u128) -> Result<i32> {
    if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64) {
        return Err(QuoteError::out_of_range("sqrt price", sqrt_price_x64));
    }

    let msb: u32 = 127 - sqrt_price_x64.leading_zeros();
    let log2p_integer_x32 = (i128::from(msb) - 64) << 32;

    // Normalise into [2^63, 2^64) so that r * r stays below 2^128.
    let mut r = if msb >= 64 {
        sqrt_price_x64 >> (msb - 63)
    } else {
        sqrt_price_x64 << (63 - msb)
    };

    let mut bit: i128 = 0x8000_0000_0000_0000;
    let mut log2p_fraction_x64: i128 = 0;
    let mut precision = 0;
    while bit > 0 && precision < BIT_PRECISION {
        r *= r;
        let is_r_more_than_two = (r >> 127) as u32;
        r >>= 63 + is_r_more_than_two;
        log2p_fraction_x64 += bit * i128::from(is_r_more_than_two);
        bit >>= 1;
        precision += 1;
    }

    let log2p_fraction_x32 = log2p_fraction_x64 >> 32;
    let log2p_x32 = log2p_integer_x32 + log2p_fraction_x32;
    let log_sqrt_10001_x64 = log2p_x32 * LOG_B_2_X32;

    let tick_low = ((log_sqrt_10001_x64 - LOG_B_P_ERR_MARGIN_LOWER_X64) >> 64) as i32;
    let tick_high = ((log_sqrt_10001_x64 + LOG_B_P_ERR_MARGIN_UPPER_X64) >> 64) as i32;

    if tick_low == tick_high {
        Ok(tick_low)
    } else if get_sqrt_price_at_tick(tick_high)? <= sqrt_price_x64 {
        Ok(tick_high)
    } else {
        Ok(tick_low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_match_constants() {
        assert_eq!(get_sqrt_price_at_tick(MIN_TICK).unwrap(), MIN_SQRT_PRICE_X64);
        assert_eq!(get_sqrt_price_at_tick(MAX_TICK).unwrap(), MAX_SQRT_PRICE_X64);
        assert_eq!(get_sqrt_price_at_tick(0).unwrap(), 1u128 << 64);
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            get_sqrt_price_at_tick(MAX_TICK + 1),
            Err(QuoteError::OutOfRange { .. })
        ));
        assert!(matches!(
            get_sqrt_price_at_tick(MIN_TICK - 1),
            Err(QuoteError::OutOfRange { .. })
        ));
        assert!(get_tick_at_sqrt_price(MIN_SQRT_PRICE_X64 - 1).is_err());
        assert!(get_tick_at_sqrt_price(MAX_SQRT_PRICE_X64 + 1).is_err());
    }

    #[test]
    fn test_monotonic() {
        let mut previous = get_sqrt_price_at_tick(-1000).unwrap();
        for tick in -999..1000 {
            let current = get_sqrt_price_at_tick(tick).unwrap();
            assert!(current > previous, "tick {tick}");
            previous = current;
        }
    }

    #[test]
    fn test_round_trip() {
        let mut ticks: Vec<i32> = (MIN_TICK..=MAX_TICK).step_by(997).collect();
        ticks.extend([MIN_TICK, MIN_TICK + 1, -1, 0, 1, MAX_TICK - 1, MAX_TICK]);
        ticks.extend(-200..200);
        for tick in ticks {
            let sqrt_price = get_sqrt_price_at_tick(tick).unwrap();
            assert_eq!(get_tick_at_sqrt_price(sqrt_price).unwrap(), tick, "tick {tick}");
        }
    }

    #[test]
    fn test_price_between_ticks_rounds_down() {
        for tick in [-50_000, -7, 0, 13, 120_000] {
            let sqrt_price = get_sqrt_price_at_tick(tick).unwrap();
            let next = get_sqrt_price_at_tick(tick + 1).unwrap();
            assert_eq!(get_tick_at_sqrt_price(sqrt_price + 1).unwrap(), tick);
            assert_eq!(get_tick_at_sqrt_price(next - 1).unwrap(), tick);
        }
    }
}
