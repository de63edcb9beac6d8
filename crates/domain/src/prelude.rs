//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use clmm_quote_domain::prelude::*;
//! ```

// Entities
pub use crate::entities::bitmap_extension::{
    EXTENSION_TICKARRAY_BITMAP_SIZE, TickArrayBitmapExtension,
};
pub use crate::entities::pool::{PoolSnapshot, TICK_ARRAY_BITMAP_WORDS};
pub use crate::entities::tick::Tick;
pub use crate::entities::tick_array::{
    TICK_ARRAY_SIZE, TickArray, check_start_index, tick_array_start_index, tick_count,
};

// Enums
pub use crate::enums::{Protocol, SwapDirection, SwapMode};

// Errors
pub use crate::error::{QuoteError, Result};

// Math
pub use crate::math::price::{price_to_sqrt_price_x64, price_to_tick, sqrt_price_x64_to_price};
pub use crate::math::swap_math::{FEE_RATE_DENOMINATOR, SwapStep, compute_swap_step};
pub use crate::math::tick_math::{
    MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK, get_sqrt_price_at_tick,
    get_tick_at_sqrt_price,
};

// Value objects
pub use crate::value_objects::{Price, Slippage, TokenAmount};
