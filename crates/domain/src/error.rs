//! Error taxonomy shared by the quote engine.

/// Errors raised while decoding pool state, converting prices or simulating swaps.
///
/// None of these are retried by the engine. A quote is never silently
/// defaulted to zero when one of them occurs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    /// Tick or sqrt price outside the supported bound.
    #[error("{what} {value} is outside the supported range")]
    OutOfRange {
        /// Name of the offending quantity.
        what: &'static str,
        /// Offending value, rendered for display.
        value: String,
    },
    /// Price limit lies on the wrong side of the current price.
    #[error("sqrt price limit {limit} is invalid for a swap from {current}")]
    InvalidPriceLimit {
        /// Caller-supplied limit.
        limit: u128,
        /// Current pool sqrt price.
        current: u128,
    },
    /// The pool cannot fill any part of the requested swap.
    #[error("insufficient liquidity to quote this size")]
    InsufficientLiquidity,
    /// Snapshot data contradicts itself or the store is missing an account.
    #[error("inconsistent pool state: {0}")]
    InconsistentState(String),
    /// Input was too small to move the price.
    #[error("swap produces zero output")]
    ZeroOutput,
    /// The stepper did not terminate within the configured step cap.
    #[error("swap did not terminate within {0} steps")]
    StepLimitExceeded(usize),
    /// Requested amount was zero.
    #[error("swap amount must not be zero")]
    ZeroAmount,
    /// Slippage tolerance above 100%.
    #[error("slippage of {0} bps exceeds 10000")]
    InvalidSlippage(u32),
    /// Fixed-point arithmetic overflowed or divided by zero.
    #[error("math overflow in {0}")]
    MathOverflow(&'static str),
    /// Start index is not aligned to the tick array width.
    #[error("tick array start index {start_index} is not aligned to tick spacing {tick_spacing}")]
    InvalidTickArrayStartIndex {
        /// Offending start index.
        start_index: i32,
        /// Pool tick spacing.
        tick_spacing: u16,
    },
}

impl QuoteError {
    /// Builds an [`QuoteError::OutOfRange`] for any displayable value.
    pub fn out_of_range(what: &'static str, value: impl ToString) -> Self {
        Self::OutOfRange {
            what,
            value: value.to_string(),
        }
    }

    /// Returns true for errors caused by caller input rather than pool data.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. }
                | Self::InvalidPriceLimit { .. }
                | Self::ZeroAmount
                | Self::InvalidSlippage(_)
        )
    }
}

/// Result alias used across the domain and simulation crates.
pub type Result<T> = std::result::Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuoteError::out_of_range("tick", 500_000);
        assert_eq!(err.to_string(), "tick 500000 is outside the supported range");

        let err = QuoteError::StepLimitExceeded(10);
        assert_eq!(err.to_string(), "swap did not terminate within 10 steps");
    }

    #[test]
    fn test_caller_errors() {
        assert!(QuoteError::ZeroAmount.is_caller_error());
        assert!(QuoteError::InvalidSlippage(20_000).is_caller_error());
        assert!(!QuoteError::InsufficientLiquidity.is_caller_error());
        assert!(!QuoteError::InconsistentState("missing".into()).is_caller_error());
    }
}
