use super::amount::TokenAmount;
use crate::error::Result;
use crate::math::price::sqrt_price_x64_to_price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price of token 0 in units of token 1, UI-scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    pub value: Decimal,
}

impl Price {
    #[must_use]
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Price implied by a Q64.64 sqrt price.
    ///
    /// # Errors
    /// Fails if the value does not fit in a `Decimal`.
    pub fn from_sqrt_price_x64(sqrt_price_x64: u128, decimals_0: u8, decimals_1: u8) -> Result<Self> {
        sqrt_price_x64_to_price(sqrt_price_x64, decimals_0, decimals_1).map(Self::new)
    }

    /// Average price paid: output per unit of input. `None` for zero input.
    ///
    /// # Errors
    /// Fails if either amount cannot be rendered in UI units.
    pub fn execution(amount_in: TokenAmount, amount_out: TokenAmount) -> Result<Option<Self>> {
        let input = amount_in.to_decimal()?;
        if input.is_zero() {
            return Ok(None);
        }
        Ok(amount_out.to_decimal()?.checked_div(input).map(Self::new))
    }

    #[must_use]
    pub fn invert(&self) -> Self {
        if self.value.is_zero() {
            return Self {
                value: Decimal::ZERO,
            };
        }
        Self {
            value: Decimal::ONE / self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_execution_price() {
        let price = Price::execution(TokenAmount::new(2_000_000_000, 9), TokenAmount::new(300_000_000, 6))
            .unwrap()
            .unwrap();
        assert_eq!(price.value, dec!(150));
        assert_eq!(price.invert().value.round_dp(6), dec!(0.006667));
        assert!(Price::execution(TokenAmount::new(0, 9), TokenAmount::new(1, 6)).unwrap().is_none());
    }

    #[test]
    fn test_from_sqrt_price() {
        let price = Price::from_sqrt_price_x64(1 << 64, 9, 6).unwrap();
        assert_eq!(price.value, dec!(1000));
    }
}
