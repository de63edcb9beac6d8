//! Fixed-point arithmetic reproducing the on-chain CLMM program.

pub mod full_math;
pub mod liquidity_math;
pub mod price;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick_math;
