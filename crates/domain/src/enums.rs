use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported pool programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// Raydium concentrated-liquidity market maker.
    RaydiumClmm,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RaydiumClmm => write!(f, "raydium-clmm"),
        }
    }
}

/// Which token enters the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Token 0 in, token 1 out; price moves down.
    ZeroForOne,
    /// Token 1 in, token 0 out; price moves up.
    OneForZero,
}

impl SwapDirection {
    /// True for [`SwapDirection::ZeroForOne`].
    #[must_use]
    pub fn is_zero_for_one(self) -> bool {
        matches!(self, Self::ZeroForOne)
    }

    /// The reverse direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::ZeroForOne => Self::OneForZero,
            Self::OneForZero => Self::ZeroForOne,
        }
    }
}

/// Which side of the swap is fixed by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapMode {
    /// The input amount (fee included) is fixed.
    #[default]
    ExactInput,
    /// The output amount is fixed.
    ExactOutput,
}

impl SwapMode {
    /// True for [`SwapMode::ExactInput`].
    #[must_use]
    pub fn is_base_input(self) -> bool {
        matches!(self, Self::ExactInput)
    }
}
