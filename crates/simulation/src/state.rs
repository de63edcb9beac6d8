//! Swap state management.
//!
//! This module provides the running state of one simulated swap, the
//! per-step trace it records and the engine configuration.

use clmm_quote_domain::entities::pool::PoolSnapshot;
use serde::{Deserialize, Serialize};

/// Why the stepper stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapTermination {
    /// Still iterating.
    Stepping,
    /// The whole specified amount was used.
    AmountExhausted,
    /// The price reached the caller's limit first.
    PriceLimitReached,
    /// No initialised tick array remains in the swap direction.
    LiquidityExhausted,
}

/// One segment of a swap between two prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Price at the start of the step.
    pub sqrt_price_start_x64: u128,
    /// Price at the end of the step.
    pub sqrt_price_end_x64: u128,
    /// Initialised tick targeted by the step.
    pub tick_next: i32,
    /// Liquidity active during the step.
    pub liquidity: u128,
    /// Input consumed, excluding fee.
    pub amount_in: u64,
    /// Output produced.
    pub amount_out: u64,
    /// Fee charged.
    pub fee_amount: u64,
    /// Whether `tick_next` was crossed.
    pub crossed: bool,
}

impl StepRecord {
    /// Input taken from the trader in this step.
    #[must_use]
    pub fn consumed(&self) -> u64 {
        self.amount_in.saturating_add(self.fee_amount)
    }
}

/// Running state of one swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapState {
    /// Specified amount not yet filled.
    pub amount_specified_remaining: u64,
    /// Output (exact input) or input including fee (exact output) so far.
    pub amount_calculated: u64,
    /// Current sqrt price.
    pub sqrt_price_x64: u128,
    /// Current tick.
    pub tick: i32,
    /// Active liquidity.
    pub liquidity: u128,
    /// Input consumed excluding fee.
    pub amount_in: u64,
    /// Output produced.
    pub amount_out: u64,
    /// Fee charged.
    pub fee_amount: u64,
    /// Tick arrays traversed, in order, without repeats.
    pub touched_tick_arrays: Vec<i32>,
    /// Per-step trace.
    pub steps: Vec<StepRecord>,
    /// Stop reason.
    pub termination: SwapTermination,
}

impl SwapState {
    /// Initial state for a swap of `amount` against `pool`.
    #[must_use]
    pub fn new(pool: &PoolSnapshot, amount: u64) -> Self {
        Self {
            amount_specified_remaining: amount,
            amount_calculated: 0,
            sqrt_price_x64: pool.sqrt_price_x64,
            tick: pool.tick_current,
            liquidity: pool.liquidity,
            amount_in: 0,
            amount_out: 0,
            fee_amount: 0,
            touched_tick_arrays: Vec::new(),
            steps: Vec::new(),
            termination: SwapTermination::Stepping,
        }
    }

    /// Records a traversed tick array once.
    pub fn touch(&mut self, start_index: i32) {
        if !self.touched_tick_arrays.contains(&start_index) {
            self.touched_tick_arrays.push(start_index);
        }
    }

    /// Whether any amount moved.
    #[must_use]
    pub fn made_progress(&self) -> bool {
        self.amount_in != 0 || self.amount_out != 0 || self.fee_amount != 0
    }
}

/// Configuration for the quote engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of swap steps before giving up.
    pub max_steps: usize,
    /// Treat a partial fill as insufficient liquidity.
    pub require_full_fill: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 1_000,
            require_full_fill: false,
        }
    }
}

impl EngineConfig {
    /// Creates a config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the step cap.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets whether partial fills are rejected.
    #[must_use]
    pub fn with_require_full_fill(mut self, require_full_fill: bool) -> Self {
        self.require_full_fill = require_full_fill;
        self
    }
}
