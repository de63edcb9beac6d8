use crate::error::{QuoteError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Raw on-chain token amount together with its mint decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Amount in base units.
    pub raw: u64,
    /// Mint decimals.
    pub decimals: u8,
}

impl TokenAmount {
    #[must_use]
    pub fn new(raw: u64, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Converts a UI amount into base units, truncating extra precision.
    ///
    /// # Errors
    /// Returns [`QuoteError::OutOfRange`] for negative amounts or amounts that
    /// do not fit in `u64` base units.
    pub fn from_decimal(amount: Decimal, decimals: u8) -> Result<Self> {
        if amount.is_sign_negative() {
            return Err(QuoteError::out_of_range("token amount", amount));
        }
        let multiplier = 10u64
            .checked_pow(u32::from(decimals))
            .map(Decimal::from)
            .ok_or_else(|| QuoteError::out_of_range("mint decimals", decimals))?;
        let raw = amount
            .checked_mul(multiplier)
            .and_then(|scaled| scaled.trunc().to_u64())
            .ok_or_else(|| QuoteError::out_of_range("token amount", amount))?;
        Ok(Self { raw, decimals })
    }

    /// UI amount.
    ///
    /// # Errors
    /// Returns [`QuoteError::OutOfRange`] when the decimals exceed what a
    /// `Decimal` can scale by.
    pub fn to_decimal(&self) -> Result<Decimal> {
        Decimal::try_from_i128_with_scale(i128::from(self.raw), u32::from(self.decimals))
            .map(|d| d.normalize())
            .map_err(|_| QuoteError::out_of_range("mint decimals", self.decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_round_trip() {
        let amount = TokenAmount::from_decimal(dec!(1.5), 9).unwrap();
        assert_eq!(amount.raw, 1_500_000_000);
        assert_eq!(amount.to_decimal().unwrap(), dec!(1.5));
    }

    #[test]
    fn test_truncates_excess_precision() {
        let amount = TokenAmount::from_decimal(dec!(0.0000019), 6).unwrap();
        assert_eq!(amount.raw, 1);
    }

    #[test]
    fn test_rejects_invalid_amounts() {
        assert!(TokenAmount::from_decimal(dec!(-1), 6).is_err());
        assert!(TokenAmount::from_decimal(dec!(100000000000000), 9).is_err());
    }
}
