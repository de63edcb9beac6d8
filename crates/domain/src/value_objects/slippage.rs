use crate::error::{QuoteError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Basis points in 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Slippage tolerance in basis points, at most 100%.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slippage(u32);

impl Slippage {
    /// Creates a tolerance from basis points.
    ///
    /// # Errors
    /// Returns [`QuoteError::InvalidSlippage`] above 10000 bps.
    pub fn from_bps(bps: u32) -> Result<Self> {
        if bps > BPS_DENOMINATOR {
            return Err(QuoteError::InvalidSlippage(bps));
        }
        Ok(Self(bps))
    }

    /// Tolerance in basis points.
    #[must_use]
    pub fn to_bps(self) -> u32 {
        self.0
    }

    /// Tolerance as a fraction, e.g. `0.01` for 100 bps.
    #[must_use]
    pub fn as_fraction(self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(BPS_DENOMINATOR)
    }

    /// `floor(amount_out * (10000 - bps) / 10000)`.
    #[must_use]
    pub fn min_amount_out(self, amount_out: u64) -> u64 {
        let scaled = u128::from(amount_out) * u128::from(BPS_DENOMINATOR - self.0);
        // Never exceeds amount_out, so it fits.
        (scaled / u128::from(BPS_DENOMINATOR)) as u64
    }

    /// `ceil(amount_in * (10000 + bps) / 10000)`, saturating at `u64::MAX`.
    #[must_use]
    pub fn max_amount_in(self, amount_in: u64) -> u64 {
        let scaled = u128::from(amount_in) * u128::from(BPS_DENOMINATOR + self.0);
        u64::try_from(scaled.div_ceil(u128::from(BPS_DENOMINATOR))).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_min_amount_out() {
        let slippage = Slippage::from_bps(100).unwrap();
        assert_eq!(slippage.min_amount_out(10_000), 9_900);
        assert_eq!(slippage.min_amount_out(99), 98);
        assert_eq!(Slippage::default().min_amount_out(12_345), 12_345);
        assert_eq!(Slippage::from_bps(10_000).unwrap().min_amount_out(500), 0);
    }

    #[test]
    fn test_max_amount_in() {
        let slippage = Slippage::from_bps(50).unwrap();
        assert_eq!(slippage.max_amount_in(10_000), 10_050);
        assert_eq!(slippage.max_amount_in(1), 2);
        assert_eq!(slippage.max_amount_in(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_bounds() {
        assert!(matches!(
            Slippage::from_bps(10_001),
            Err(QuoteError::InvalidSlippage(10_001))
        ));
        assert_eq!(Slippage::from_bps(250).unwrap().as_fraction(), dec!(0.025));
        assert_eq!(Slippage::from_bps(250).unwrap().to_bps(), 250);
    }
}
