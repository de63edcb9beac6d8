//! Quote computation over a pool snapshot.
//!
//! [`QuoteComputer`] validates a swap request, drives the [`SwapStepper`]
//! and turns the final state into a [`SwapResult`], optionally wrapped in a
//! slippage-bounded [`Quote`].

use crate::address::TickArrayAddressResolver;
use crate::bitmap::BitmapNavigator;
use crate::state::{EngineConfig, StepRecord, SwapTermination};
use crate::stepper::SwapStepper;
use crate::store::TickArrayStore;
use clmm_quote_domain::entities::bitmap_extension::TickArrayBitmapExtension;
use clmm_quote_domain::entities::pool::PoolSnapshot;
use clmm_quote_domain::enums::{SwapDirection, SwapMode};
use clmm_quote_domain::error::{QuoteError, Result};
use clmm_quote_domain::math::tick_math::{MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};
use clmm_quote_domain::value_objects::Slippage;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

/// A swap to quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub direction: SwapDirection,
    pub mode: SwapMode,
    /// Input amount for exact input, output amount for exact output.
    pub amount: u64,
    /// Price bound; the full range is used when absent.
    pub sqrt_price_limit_x64: Option<u128>,
}

impl SwapRequest {
    #[must_use]
    pub fn exact_input(direction: SwapDirection, amount: u64) -> Self {
        Self {
            direction,
            mode: SwapMode::ExactInput,
            amount,
            sqrt_price_limit_x64: None,
        }
    }

    #[must_use]
    pub fn exact_output(direction: SwapDirection, amount: u64) -> Self {
        Self {
            direction,
            mode: SwapMode::ExactOutput,
            amount,
            sqrt_price_limit_x64: None,
        }
    }

    /// Sets the price bound.
    #[must_use]
    pub fn with_price_limit(mut self, sqrt_price_limit_x64: u128) -> Self {
        self.sqrt_price_limit_x64 = Some(sqrt_price_limit_x64);
        self
    }
}

/// Outcome of a simulated swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapResult {
    /// Input paid by the trader, fee included.
    pub amount_in: u64,
    /// Output received by the trader.
    pub amount_out: u64,
    /// Part of `amount_in` kept as fee.
    pub fee_amount: u64,
    /// Pool sqrt price after the swap.
    pub sqrt_price_x64: u128,
    /// Pool tick after the swap.
    pub tick_current: i32,
    /// Active liquidity after the swap.
    pub liquidity: u128,
    /// Start indices of traversed tick arrays, in traversal order.
    pub touched_tick_arrays: Vec<i32>,
    /// Accounts of `touched_tick_arrays`, same order.
    pub touched_tick_array_addresses: Vec<Pubkey>,
    pub termination: SwapTermination,
    /// Whether the whole specified amount was filled.
    pub fully_filled: bool,
    pub steps: Vec<StepRecord>,
}

/// A swap result with its slippage bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub direction: SwapDirection,
    pub mode: SwapMode,
    pub result: SwapResult,
    pub slippage: Slippage,
    /// Minimum output for exact input, maximum input for exact output.
    pub other_amount_threshold: u64,
}

impl Quote {
    /// The output floor of an exact-input quote.
    #[must_use]
    pub fn min_amount_out(&self) -> Option<u64> {
        self.mode
            .is_base_input()
            .then_some(self.other_amount_threshold)
    }

    /// The input ceiling of an exact-output quote.
    #[must_use]
    pub fn max_amount_in(&self) -> Option<u64> {
        (!self.mode.is_base_input()).then_some(self.other_amount_threshold)
    }
}

/// Quotes swaps against one immutable snapshot.
pub struct QuoteComputer<'a, S: TickArrayStore + ?Sized, R: TickArrayAddressResolver + ?Sized> {
    pool: &'a PoolSnapshot,
    extension: Option<&'a TickArrayBitmapExtension>,
    store: &'a S,
    resolver: &'a R,
    config: EngineConfig,
}

impl<'a, S, R> QuoteComputer<'a, S, R>
where
    S: TickArrayStore + ?Sized,
    R: TickArrayAddressResolver + ?Sized,
{
    /// Creates a computer with the default engine config.
    #[must_use]
    pub fn new(
        pool: &'a PoolSnapshot,
        extension: Option<&'a TickArrayBitmapExtension>,
        store: &'a S,
        resolver: &'a R,
    ) -> Self {
        Self {
            pool,
            extension,
            store,
            resolver,
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Simulates an exact-input swap.
    ///
    /// # Errors
    /// See [`QuoteComputer::simulate_request`].
    pub fn simulate(
        &self,
        direction: SwapDirection,
        amount: u64,
        sqrt_price_limit_x64: Option<u128>,
    ) -> Result<SwapResult> {
        let mut request = SwapRequest::exact_input(direction, amount);
        request.sqrt_price_limit_x64 = sqrt_price_limit_x64;
        self.simulate_request(&request)
    }

    /// Simulates a swap of either mode.
    ///
    /// # Errors
    /// - [`QuoteError::ZeroAmount`] for a zero amount
    /// - [`QuoteError::InvalidPriceLimit`] for a limit on the wrong side
    /// - [`QuoteError::InsufficientLiquidity`] when nothing can be filled
    /// - [`QuoteError::ZeroOutput`] when input is consumed for no output
    /// - snapshot, step-cap and math errors from the stepper
    pub fn simulate_request(&self, request: &SwapRequest) -> Result<SwapResult> {
        self.pool.validate()?;
        if request.amount == 0 {
            return Err(QuoteError::ZeroAmount);
        }
        let limit = self.resolve_price_limit(request)?;

        let navigator =
            BitmapNavigator::new(self.pool.tick_spacing, &self.pool.tick_array_bitmap, self.extension);
        let state = SwapStepper::new(self.pool, navigator, self.store, self.config.max_steps).run(
            request.direction,
            request.mode,
            request.amount,
            limit,
        )?;

        if !state.made_progress() {
            return Err(QuoteError::InsufficientLiquidity);
        }
        let fully_filled = state.amount_specified_remaining == 0;
        if !fully_filled && state.termination == SwapTermination::LiquidityExhausted {
            if self.config.require_full_fill {
                return Err(QuoteError::InsufficientLiquidity);
            }
            warn!(
                requested = request.amount,
                unfilled = state.amount_specified_remaining,
                "liquidity exhausted before the swap was filled"
            );
        }
        if state.amount_out == 0 {
            return Err(QuoteError::ZeroOutput);
        }

        let amount_in = state
            .amount_in
            .checked_add(state.fee_amount)
            .ok_or(QuoteError::MathOverflow("amount in with fee"))?;
        let touched_tick_array_addresses = state
            .touched_tick_arrays
            .iter()
            .map(|start| self.resolver.tick_array_address(*start))
            .collect();

        debug!(
            direction = ?request.direction,
            mode = ?request.mode,
            amount_in,
            amount_out = state.amount_out,
            fee = state.fee_amount,
            arrays = state.touched_tick_arrays.len(),
            "swap simulated"
        );

        Ok(SwapResult {
            amount_in,
            amount_out: state.amount_out,
            fee_amount: state.fee_amount,
            sqrt_price_x64: state.sqrt_price_x64,
            tick_current: state.tick,
            liquidity: state.liquidity,
            touched_tick_arrays: state.touched_tick_arrays,
            touched_tick_array_addresses,
            termination: state.termination,
            fully_filled,
            steps: state.steps,
        })
    }

    /// Exact-input quote with `min_amount_out` derived from `slippage_bps`.
    ///
    /// # Errors
    /// [`QuoteError::InvalidSlippage`] above 10000 bps, otherwise as
    /// [`QuoteComputer::simulate`].
    pub fn quote_with_slippage(
        &self,
        direction: SwapDirection,
        amount: u64,
        slippage_bps: u32,
    ) -> Result<Quote> {
        let slippage = Slippage::from_bps(slippage_bps)?;
        let result = self.simulate_request(&SwapRequest::exact_input(direction, amount))?;
        Ok(Quote {
            direction,
            mode: SwapMode::ExactInput,
            other_amount_threshold: slippage.min_amount_out(result.amount_out),
            result,
            slippage,
        })
    }

    /// Exact-output quote with `max_amount_in` derived from `slippage_bps`.
    ///
    /// # Errors
    /// As [`QuoteComputer::quote_with_slippage`].
    pub fn quote_exact_output_with_slippage(
        &self,
        direction: SwapDirection,
        amount_out: u64,
        slippage_bps: u32,
    ) -> Result<Quote> {
        let slippage = Slippage::from_bps(slippage_bps)?;
        let result = self.simulate_request(&SwapRequest::exact_output(direction, amount_out))?;
        Ok(Quote {
            direction,
            mode: SwapMode::ExactOutput,
            other_amount_threshold: slippage.max_amount_in(result.amount_in),
            result,
            slippage,
        })
    }

    fn resolve_price_limit(&self, request: &SwapRequest) -> Result<u128> {
        let current = self.pool.sqrt_price_x64;
        let zero_for_one = request.direction.is_zero_for_one();
        let limit = request.sqrt_price_limit_x64.unwrap_or(if zero_for_one {
            MIN_SQRT_PRICE_X64 + 1
        } else {
            MAX_SQRT_PRICE_X64 - 1
        });
        let valid = if zero_for_one {
            limit > MIN_SQRT_PRICE_X64 && limit < current
        } else {
            limit > current && limit < MAX_SQRT_PRICE_X64
        };
        if !valid {
            return Err(QuoteError::InvalidPriceLimit { limit, current });
        }
        Ok(limit)
    }
}
