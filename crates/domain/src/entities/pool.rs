use crate::error::{QuoteError, Result};
use crate::math::price::sqrt_price_x64_to_price;
use crate::math::swap_math::FEE_RATE_DENOMINATOR;
use crate::math::tick_math::get_tick_at_sqrt_price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Words in the default tick-array bitmap (1024 bits).
pub const TICK_ARRAY_BITMAP_WORDS: usize = 16;

/// Point-in-time view of a concentrated-liquidity pool, as needed to quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Current tick.
    pub tick_current: i32,
    /// Current Q64.64 sqrt price.
    pub sqrt_price_x64: u128,
    /// Liquidity active at the current price.
    pub liquidity: u128,
    /// Spacing between usable ticks.
    pub tick_spacing: u16,
    /// Trade fee in millionths.
    pub fee_rate: u32,
    /// Default bitmap over array indices `[-512, 512)`.
    pub tick_array_bitmap: [u64; TICK_ARRAY_BITMAP_WORDS],
    /// Decimals of token 0.
    pub mint_decimals_0: u8,
    /// Decimals of token 1.
    pub mint_decimals_1: u8,
}

impl PoolSnapshot {
    /// Creates a snapshot whose tick is derived from the price.
    ///
    /// # Errors
    /// Fails when the sqrt price is out of range.
    pub fn new(
        sqrt_price_x64: u128,
        liquidity: u128,
        tick_spacing: u16,
        fee_rate: u32,
    ) -> Result<Self> {
        Ok(Self {
            tick_current: get_tick_at_sqrt_price(sqrt_price_x64)?,
            sqrt_price_x64,
            liquidity,
            tick_spacing,
            fee_rate,
            tick_array_bitmap: [0; TICK_ARRAY_BITMAP_WORDS],
            mint_decimals_0: 0,
            mint_decimals_1: 0,
        })
    }

    /// Sets the default bitmap.
    #[must_use]
    pub fn with_bitmap(mut self, tick_array_bitmap: [u64; TICK_ARRAY_BITMAP_WORDS]) -> Self {
        self.tick_array_bitmap = tick_array_bitmap;
        self
    }

    /// Sets the mint decimals used for display prices.
    #[must_use]
    pub fn with_decimals(mut self, mint_decimals_0: u8, mint_decimals_1: u8) -> Self {
        self.mint_decimals_0 = mint_decimals_0;
        self.mint_decimals_1 = mint_decimals_1;
        self
    }

    /// Checks the snapshot is internally consistent.
    ///
    /// # Errors
    /// Returns [`QuoteError::InconsistentState`] for zero spacing, a fee rate
    /// of 100% or more, or a tick more than one away from the one implied by
    /// the price; [`QuoteError::OutOfRange`] for an out-of-range price.
    pub fn validate(&self) -> Result<()> {
        if self.tick_spacing == 0 {
            return Err(QuoteError::InconsistentState("tick spacing is zero".into()));
        }
        if self.fee_rate >= FEE_RATE_DENOMINATOR {
            return Err(QuoteError::InconsistentState(format!(
                "fee rate {} is not below {FEE_RATE_DENOMINATOR}",
                self.fee_rate
            )));
        }
        let implied = get_tick_at_sqrt_price(self.sqrt_price_x64)?;
        if (i64::from(implied) - i64::from(self.tick_current)).abs() > 1 {
            return Err(QuoteError::InconsistentState(format!(
                "tick {} disagrees with price-implied tick {implied}",
                self.tick_current
            )));
        }
        Ok(())
    }

    /// Token 1 per token 0 in UI units.
    ///
    /// # Errors
    /// Fails if the price cannot be rendered as a `Decimal`.
    pub fn spot_price(&self) -> Result<Decimal> {
        sqrt_price_x64_to_price(self.sqrt_price_x64, self.mint_decimals_0, self.mint_decimals_1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const Q64: u128 = 1 << 64;

    #[test]
    fn test_new_derives_tick() {
        let pool = PoolSnapshot::new(Q64, 1_000, 1, 100).unwrap();
        assert_eq!(pool.tick_current, 0);
        assert!(pool.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_drifted_tick() {
        let mut pool = PoolSnapshot::new(Q64, 1_000, 1, 100).unwrap();
        pool.tick_current = 1;
        assert!(pool.validate().is_ok());
        pool.tick_current = 5;
        assert!(matches!(
            pool.validate(),
            Err(QuoteError::InconsistentState(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let mut pool = PoolSnapshot::new(Q64, 1_000, 1, 100).unwrap();
        pool.tick_spacing = 0;
        assert!(pool.validate().is_err());
        pool.tick_spacing = 1;
        pool.fee_rate = FEE_RATE_DENOMINATOR;
        assert!(pool.validate().is_err());
    }

    #[test]
    fn test_spot_price_uses_decimals() {
        let pool = PoolSnapshot::new(Q64, 0, 1, 0).unwrap().with_decimals(9, 6);
        assert_eq!(pool.spot_price().unwrap(), dec!(1000));
    }
}
