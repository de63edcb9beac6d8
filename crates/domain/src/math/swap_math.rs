//! Single swap step inside one liquidity range.

use super::full_math::{MulDiv, u256_to_u64};
use super::{liquidity_math, sqrt_price_math};
use crate::error::{QuoteError, Result};
use serde::{Deserialize, Serialize};

/// Fee rates are expressed in millionths.
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;

/// Outcome of one step toward a target price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStep {
    /// Price after the step; never beyond the target.
    pub sqrt_price_next_x64: u128,
    /// Input consumed, excluding fee.
    pub amount_in: u64,
    /// Output produced.
    pub amount_out: u64,
    /// Fee charged on the input.
    pub fee_amount: u64,
}

/// Amount needed (input) or available (output) to move all the way to the
/// target. `None` means the amount exceeds `u64`, so the target is out of reach.
fn amount_to_target(
    sqrt_price_current_x64: u128,
    sqrt_price_target_x64: u128,
    liquidity: u128,
    zero_for_one: bool,
    is_base_input: bool,
) -> Result<Option<u64>> {
    let wide = match (is_base_input, zero_for_one) {
        (true, true) => liquidity_math::get_delta_amount_0_wide(
            sqrt_price_target_x64,
            sqrt_price_current_x64,
            liquidity,
            true,
        )?,
        (true, false) => liquidity_math::get_delta_amount_1_wide(
            sqrt_price_current_x64,
            sqrt_price_target_x64,
            liquidity,
            true,
        )?,
        (false, true) => liquidity_math::get_delta_amount_1_wide(
            sqrt_price_target_x64,
            sqrt_price_current_x64,
            liquidity,
            false,
        )?,
        (false, false) => liquidity_math::get_delta_amount_0_wide(
            sqrt_price_current_x64,
            sqrt_price_target_x64,
            liquidity,
            false,
        )?,
    };
    Ok(u256_to_u64(wide))
}

/// Swaps as much of `amount_remaining` as the range from the current price
/// to `sqrt_price_target_x64` allows.
///
/// For exact input `amount_remaining` is input including fee; for exact
/// output it is output still owed. Direction is given by `zero_for_one`.
///
/// # Errors
/// Returns [`QuoteError::MathOverflow`] on unrepresentable intermediate values
/// and when `fee_rate` is not below [`FEE_RATE_DENOMINATOR`].
pub fn compute_swap_step(
    sqrt_price_current_x64: u128,
    sqrt_price_target_x64: u128,
    liquidity: u128,
    amount_remaining: u64,
    fee_rate: u32,
    is_base_input: bool,
    zero_for_one: bool,
) -> Result<SwapStep> {
    if fee_rate >= FEE_RATE_DENOMINATOR {
        return Err(QuoteError::MathOverflow("fee rate"));
    }
    let fee_complement = u64::from(FEE_RATE_DENOMINATOR - fee_rate);
    let mut step = SwapStep::default();

    let to_target = amount_to_target(
        sqrt_price_current_x64,
        sqrt_price_target_x64,
        liquidity,
        zero_for_one,
        is_base_input,
    )?;

    if is_base_input {
        let amount_remaining_less_fee = amount_remaining
            .mul_div_floor(fee_complement, u64::from(FEE_RATE_DENOMINATOR))
            .ok_or(QuoteError::MathOverflow("amount less fee"))?;
        if let Some(amount_in) = to_target {
            step.amount_in = amount_in;
        }
        step.sqrt_price_next_x64 = match to_target {
            Some(amount_in) if amount_remaining_less_fee >= amount_in => sqrt_price_target_x64,
            _ => sqrt_price_math::get_next_sqrt_price_from_input(
                sqrt_price_current_x64,
                liquidity,
                amount_remaining_less_fee,
                zero_for_one,
            )?,
        };
    } else {
        if let Some(amount_out) = to_target {
            step.amount_out = amount_out;
        }
        step.sqrt_price_next_x64 = match to_target {
            Some(amount_out) if amount_remaining >= amount_out => sqrt_price_target_x64,
            _ => sqrt_price_math::get_next_sqrt_price_from_output(
                sqrt_price_current_x64,
                liquidity,
                amount_remaining,
                zero_for_one,
            )?,
        };
    }

    let reached_target = step.sqrt_price_next_x64 == sqrt_price_target_x64;

    // Recompute whichever side was not pinned by reaching the target.
    if zero_for_one {
        if !(reached_target && is_base_input) {
            step.amount_in = liquidity_math::get_delta_amount_0_unsigned(
                step.sqrt_price_next_x64,
                sqrt_price_current_x64,
                liquidity,
                true,
            )?;
        }
        if !(reached_target && !is_base_input) {
            step.amount_out = liquidity_math::get_delta_amount_1_unsigned(
                step.sqrt_price_next_x64,
                sqrt_price_current_x64,
                liquidity,
                false,
            )?;
        }
    } else {
        if !(reached_target && is_base_input) {
            step.amount_in = liquidity_math::get_delta_amount_1_unsigned(
                sqrt_price_current_x64,
                step.sqrt_price_next_x64,
                liquidity,
                true,
            )?;
        }
        if !(reached_target && !is_base_input) {
            step.amount_out = liquidity_math::get_delta_amount_0_unsigned(
                sqrt_price_current_x64,
                step.sqrt_price_next_x64,
                liquidity,
                false,
            )?;
        }
    }

    if !is_base_input && step.amount_out > amount_remaining {
        step.amount_out = amount_remaining;
    }

    step.fee_amount = if is_base_input && !reached_target {
        // Rounding dust stays with the pool as fee.
        amount_remaining
            .checked_sub(step.amount_in)
            .ok_or(QuoteError::MathOverflow("fee remainder"))?
    } else {
        step.amount_in
            .mul_div_ceil(u64::from(fee_rate), fee_complement)
            .ok_or(QuoteError::MathOverflow("fee amount"))?
    };

    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::get_sqrt_price_at_tick;

    const Q64: u128 = 1 << 64;

    #[test]
    fn test_exact_input_stops_inside_range() {
        let target = get_sqrt_price_at_tick(-1000).unwrap();
        let step = compute_swap_step(Q64, target, 1_000_000_000, 1_000, 3000, true, true).unwrap();
        assert!(step.sqrt_price_next_x64 < Q64);
        assert!(step.sqrt_price_next_x64 > target);
        // Whole input is consumed when the target is not reached.
        assert_eq!(step.amount_in + step.fee_amount, 1_000);
        assert!(step.amount_out > 0 && step.amount_out < 1_000);
    }

    #[test]
    fn test_exact_input_reaches_target() {
        let target = get_sqrt_price_at_tick(10).unwrap();
        let step = compute_swap_step(Q64, target, 1_000_000, 1_000_000, 3000, true, false).unwrap();
        assert_eq!(step.sqrt_price_next_x64, target);
        assert!(step.amount_in + step.fee_amount <= 1_000_000);
        assert_eq!(
            step.fee_amount,
            step.amount_in.mul_div_ceil(3000, 997_000).unwrap()
        );
    }

    #[test]
    fn test_exact_output_caps_output() {
        let target = get_sqrt_price_at_tick(-5000).unwrap();
        let step = compute_swap_step(Q64, target, 1_000_000_000, 10_000, 500, false, true).unwrap();
        assert_eq!(step.amount_out, 10_000);
        assert!(step.amount_in >= 10_000);
        assert!(step.fee_amount > 0);
    }

    #[test]
    fn test_zero_fee_has_no_fee() {
        let target = get_sqrt_price_at_tick(100).unwrap();
        let step = compute_swap_step(Q64, target, 1_000_000, 100, 0, true, false).unwrap();
        assert_eq!(step.fee_amount + step.amount_in, 100);
        let reached = compute_swap_step(Q64, target, 1_000_000, u64::MAX / 2, 0, true, false).unwrap();
        assert_eq!(reached.sqrt_price_next_x64, target);
        assert_eq!(reached.fee_amount, 0);
    }

    #[test]
    fn test_zero_liquidity_jumps_to_target() {
        let target = get_sqrt_price_at_tick(60).unwrap();
        let step = compute_swap_step(Q64, target, 0, 1_000, 2500, true, false).unwrap();
        assert_eq!(step.sqrt_price_next_x64, target);
        assert_eq!(step.amount_in, 0);
        assert_eq!(step.amount_out, 0);
        assert_eq!(step.fee_amount, 0);
    }

    #[test]
    fn test_unreachable_target_falls_back_to_amount() {
        // Moving to the max price needs far more than u64 of token 1.
        let target = get_sqrt_price_at_tick(400_000).unwrap();
        let step = compute_swap_step(Q64, target, u128::from(u64::MAX), 1_000_000, 100, true, false)
            .unwrap();
        assert!(step.sqrt_price_next_x64 < target);
        assert_eq!(step.amount_in + step.fee_amount, 1_000_000);
    }

    #[test]
    fn test_fee_rate_must_be_below_denominator() {
        assert!(compute_swap_step(Q64, Q64 / 2, 1, 1, FEE_RATE_DENOMINATOR, true, true).is_err());
    }
}
