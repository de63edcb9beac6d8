//! Iterative swap simulation across initialised ticks.

use crate::bitmap::BitmapNavigator;
use crate::state::{StepRecord, SwapState, SwapTermination};
use crate::store::TickArrayStore;
use clmm_quote_domain::entities::pool::PoolSnapshot;
use clmm_quote_domain::entities::tick::Tick;
use clmm_quote_domain::entities::tick_array::{TickArray, tick_array_start_index};
use clmm_quote_domain::enums::{SwapDirection, SwapMode};
use clmm_quote_domain::error::{QuoteError, Result};
use clmm_quote_domain::math::liquidity_math::add_delta;
use clmm_quote_domain::math::swap_math::compute_swap_step;
use clmm_quote_domain::math::tick_math::{
    MAX_TICK, MIN_TICK, get_sqrt_price_at_tick, get_tick_at_sqrt_price,
};
use tracing::{debug, trace};

/// Drives one swap over a snapshot, one initialised tick at a time.
pub struct SwapStepper<'a, S: TickArrayStore + ?Sized> {
    pool: &'a PoolSnapshot,
    navigator: BitmapNavigator<'a>,
    store: &'a S,
    max_steps: usize,
}

impl<'a, S: TickArrayStore + ?Sized> SwapStepper<'a, S> {
    /// Creates a stepper.
    #[must_use]
    pub fn new(
        pool: &'a PoolSnapshot,
        navigator: BitmapNavigator<'a>,
        store: &'a S,
        max_steps: usize,
    ) -> Self {
        Self {
            pool,
            navigator,
            store,
            max_steps,
        }
    }

    /// Runs the swap until the amount is used, the price limit is hit or
    /// liquidity runs out. Inputs are assumed validated by the caller.
    ///
    /// # Errors
    /// Returns [`QuoteError::StepLimitExceeded`] past the step cap,
    /// [`QuoteError::InconsistentState`] when a flagged array is missing or
    /// crossing corrupts liquidity, and math errors from the step functions.
    pub fn run(
        &self,
        direction: SwapDirection,
        mode: SwapMode,
        amount: u64,
        sqrt_price_limit_x64: u128,
    ) -> Result<SwapState> {
        let zero_for_one = direction.is_zero_for_one();
        let is_base_input = mode.is_base_input();
        let tick_spacing = self.pool.tick_spacing;
        let mut state = SwapState::new(self.pool, amount);

        let Some(first_start) = self
            .navigator
            .first_initialized_tick_array(self.pool.tick_current, direction)?
        else {
            debug!(tick = self.pool.tick_current, ?direction, "no initialised tick array");
            state.termination = SwapTermination::LiquidityExhausted;
            return Ok(state);
        };

        // When the pool's own array is empty, the first array entered is
        // read from its boundary rather than from the current tick.
        let mut entered_from_boundary =
            first_start != tick_array_start_index(self.pool.tick_current, tick_spacing);
        let mut current_start = first_start;
        let mut tick_array: &TickArray = self.store.require(first_start)?;
        state.touch(first_start);

        while state.amount_specified_remaining != 0 && state.sqrt_price_x64 != sqrt_price_limit_x64
        {
            if state.steps.len() >= self.max_steps {
                return Err(QuoteError::StepLimitExceeded(self.max_steps));
            }
            let sqrt_price_start_x64 = state.sqrt_price_x64;

            let mut next_tick: Option<Tick> = tick_array
                .next_initialized_tick(state.tick, tick_spacing, zero_for_one)
                .copied();
            if next_tick.is_none() && entered_from_boundary {
                entered_from_boundary = false;
                next_tick = tick_array.first_initialized_tick(zero_for_one).copied();
            }

            let next_tick = match next_tick {
                Some(tick) => tick,
                None => {
                    let Some(next_start) = self
                        .navigator
                        .next_initialized_tick_array(current_start, direction)?
                    else {
                        state.termination = SwapTermination::LiquidityExhausted;
                        break;
                    };
                    current_start = next_start;
                    tick_array = self.store.require(next_start)?;
                    state.touch(next_start);
                    *tick_array.first_initialized_tick(zero_for_one).ok_or_else(|| {
                        QuoteError::InconsistentState(format!(
                            "tick array {next_start} is flagged but holds no initialised tick"
                        ))
                    })?
                }
            };

            let tick_next = next_tick.tick.clamp(MIN_TICK, MAX_TICK);
            let sqrt_price_next_x64 = get_sqrt_price_at_tick(tick_next)?;
            let beyond_limit = if zero_for_one {
                sqrt_price_next_x64 < sqrt_price_limit_x64
            } else {
                sqrt_price_next_x64 > sqrt_price_limit_x64
            };
            let sqrt_price_target_x64 = if beyond_limit {
                sqrt_price_limit_x64
            } else {
                sqrt_price_next_x64
            };

            let step = compute_swap_step(
                state.sqrt_price_x64,
                sqrt_price_target_x64,
                state.liquidity,
                state.amount_specified_remaining,
                self.pool.fee_rate,
                is_base_input,
                zero_for_one,
            )?;
            let step_liquidity = state.liquidity;
            state.sqrt_price_x64 = step.sqrt_price_next_x64;

            let consumed = step
                .amount_in
                .checked_add(step.fee_amount)
                .ok_or(QuoteError::MathOverflow("step input"))?;
            let (filled, calculated) = if is_base_input {
                (consumed, step.amount_out)
            } else {
                (step.amount_out, consumed)
            };
            state.amount_specified_remaining = state
                .amount_specified_remaining
                .checked_sub(filled)
                .ok_or(QuoteError::MathOverflow("remaining amount"))?;
            state.amount_calculated = state
                .amount_calculated
                .checked_add(calculated)
                .ok_or(QuoteError::MathOverflow("calculated amount"))?;
            state.amount_in = state
                .amount_in
                .checked_add(step.amount_in)
                .ok_or(QuoteError::MathOverflow("total input"))?;
            state.amount_out = state
                .amount_out
                .checked_add(step.amount_out)
                .ok_or(QuoteError::MathOverflow("total output"))?;
            state.fee_amount = state
                .fee_amount
                .checked_add(step.fee_amount)
                .ok_or(QuoteError::MathOverflow("total fee"))?;

            let mut crossed = false;
            if state.sqrt_price_x64 == sqrt_price_next_x64 {
                if next_tick.is_initialized() {
                    let liquidity_net = if zero_for_one {
                        next_tick.liquidity_net.checked_neg().ok_or_else(|| {
                            QuoteError::InconsistentState(format!(
                                "liquidity net of tick {} cannot be negated",
                                next_tick.tick
                            ))
                        })?
                    } else {
                        next_tick.liquidity_net
                    };
                    state.liquidity = add_delta(state.liquidity, liquidity_net)?;
                    crossed = true;
                    trace!(
                        tick = tick_next,
                        liquidity_net,
                        liquidity = state.liquidity,
                        "crossed tick"
                    );
                }
                state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
            } else if state.sqrt_price_x64 != sqrt_price_start_x64 {
                state.tick = get_tick_at_sqrt_price(state.sqrt_price_x64)?;
            }

            state.steps.push(StepRecord {
                sqrt_price_start_x64,
                sqrt_price_end_x64: state.sqrt_price_x64,
                tick_next,
                liquidity: step_liquidity,
                amount_in: step.amount_in,
                amount_out: step.amount_out,
                fee_amount: step.fee_amount,
                crossed,
            });
        }

        if state.termination == SwapTermination::Stepping {
            state.termination = if state.amount_specified_remaining == 0 {
                SwapTermination::AmountExhausted
            } else {
                SwapTermination::PriceLimitReached
            };
        }

        debug!(
            steps = state.steps.len(),
            tick = state.tick,
            liquidity = state.liquidity,
            termination = ?state.termination,
            "swap simulation finished"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::mark_tick_array_initialized;
    use crate::store::InMemoryTickArrayStore;
    use clmm_quote_domain::entities::bitmap_extension::TickArrayBitmapExtension;
    use clmm_quote_domain::math::tick_math::{MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};

    const Q64: u128 = 1 << 64;

    /// Pool at price 1 with liquidity 1e6 between ticks -120 and 120.
    fn symmetric_pool(fee_rate: u32) -> (PoolSnapshot, InMemoryTickArrayStore) {
        let mut pool = PoolSnapshot::new(Q64, 1_000_000, 1, fee_rate).unwrap();
        let mut extension = TickArrayBitmapExtension::default();
        let lower = TickArray::empty(-120, 1)
            .unwrap()
            .with_tick(Tick::new(-120, 1_000_000, 1_000_000), 1)
            .unwrap();
        let upper = TickArray::empty(120, 1)
            .unwrap()
            .with_tick(Tick::new(120, -1_000_000, 1_000_000), 1)
            .unwrap();
        for start in [-120, 120] {
            mark_tick_array_initialized(&mut pool.tick_array_bitmap, &mut extension, start, 1)
                .unwrap();
        }
        let store = [lower, upper].into_iter().collect();
        (pool, store)
    }

    fn run(
        pool: &PoolSnapshot,
        store: &InMemoryTickArrayStore,
        direction: SwapDirection,
        mode: SwapMode,
        amount: u64,
    ) -> Result<SwapState> {
        let limit = match direction {
            SwapDirection::ZeroForOne => MIN_SQRT_PRICE_X64 + 1,
            SwapDirection::OneForZero => MAX_SQRT_PRICE_X64 - 1,
        };
        let navigator = BitmapNavigator::new(pool.tick_spacing, &pool.tick_array_bitmap, None);
        SwapStepper::new(pool, navigator, store, 100).run(direction, mode, amount, limit)
    }

    #[test]
    fn test_small_swap_stays_in_range() {
        let (pool, store) = symmetric_pool(2500);
        let state = run(&pool, &store, SwapDirection::ZeroForOne, SwapMode::ExactInput, 1_000).unwrap();
        assert_eq!(state.termination, SwapTermination::AmountExhausted);
        assert_eq!(state.amount_specified_remaining, 0);
        assert_eq!(state.amount_in + state.fee_amount, 1_000);
        assert_eq!(state.amount_calculated, state.amount_out);
        assert_eq!(state.liquidity, 1_000_000);
        assert_eq!(state.touched_tick_arrays, vec![-120]);
        assert!(state.tick < 0 && state.tick >= -120);
    }

    #[test]
    fn test_large_swap_exhausts_liquidity() {
        let (pool, store) = symmetric_pool(0);
        let state = run(&pool, &store, SwapDirection::ZeroForOne, SwapMode::ExactInput, 1_000_000)
            .unwrap();
        assert_eq!(state.termination, SwapTermination::LiquidityExhausted);
        assert_eq!(state.liquidity, 0);
        assert_eq!(state.tick, -121);
        assert!(state.amount_specified_remaining > 0);
        assert!(state.steps.iter().any(|s| s.crossed && s.tick_next == -120));
    }

    #[test]
    fn test_exact_output_fills_output() {
        let (pool, store) = symmetric_pool(3000);
        let state = run(&pool, &store, SwapDirection::OneForZero, SwapMode::ExactOutput, 500).unwrap();
        assert_eq!(state.termination, SwapTermination::AmountExhausted);
        assert_eq!(state.amount_out, 500);
        assert_eq!(state.amount_calculated, state.amount_in + state.fee_amount);
        assert!(state.amount_in >= 500);
        assert_eq!(state.touched_tick_arrays, vec![120]);
    }

    #[test]
    fn test_step_conservation() {
        let (pool, store) = symmetric_pool(10_000);
        let state = run(&pool, &store, SwapDirection::OneForZero, SwapMode::ExactInput, 50_000).unwrap();
        let consumed: u64 = state.steps.iter().map(StepRecord::consumed).sum();
        assert_eq!(consumed, 50_000 - state.amount_specified_remaining);
        let out: u64 = state.steps.iter().map(|s| s.amount_out).sum();
        assert_eq!(out, state.amount_out);
    }

    #[test]
    fn test_missing_array_is_inconsistent() {
        let (pool, _) = symmetric_pool(0);
        let empty = InMemoryTickArrayStore::new();
        assert!(matches!(
            run(&pool, &empty, SwapDirection::ZeroForOne, SwapMode::ExactInput, 10),
            Err(QuoteError::InconsistentState(_))
        ));
    }

    #[test]
    fn test_step_cap() {
        let (pool, store) = symmetric_pool(0);
        let navigator = BitmapNavigator::new(1, &pool.tick_array_bitmap, None);
        let result = SwapStepper::new(&pool, navigator, &store, 1).run(
            SwapDirection::ZeroForOne,
            SwapMode::ExactInput,
            1_000_000,
            MIN_SQRT_PRICE_X64 + 1,
        );
        assert!(matches!(result, Err(QuoteError::StepLimitExceeded(1))));
    }

    #[test]
    fn test_price_limit_stops_swap() {
        let (pool, store) = symmetric_pool(0);
        let limit = get_sqrt_price_at_tick(-10).unwrap();
        let navigator = BitmapNavigator::new(1, &pool.tick_array_bitmap, None);
        let state = SwapStepper::new(&pool, navigator, &store, 10)
            .run(SwapDirection::ZeroForOne, SwapMode::ExactInput, 1_000_000, limit)
            .unwrap();
        assert_eq!(state.termination, SwapTermination::PriceLimitReached);
        assert_eq!(state.sqrt_price_x64, limit);
        assert_eq!(state.tick, -10);
        assert_eq!(state.liquidity, 1_000_000);
    }
}
