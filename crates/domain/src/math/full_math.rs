//! Wide-integer multiply/divide helpers with explicit rounding.
//!
//! Products are formed one width up (u128 for u64 operands, U512 for U256
//! operands) so the intermediate never overflows; only the final quotient is
//! narrowed back and checked.

use primitive_types::{U256, U512};

/// Number of fractional bits in a Q64.64 value.
pub const RESOLUTION: usize = 64;

/// 2^64 as a U256.
#[must_use]
pub fn q64() -> U256 {
    U256::one() << RESOLUTION
}

/// Multiply then divide with explicit rounding direction.
pub trait MulDiv: Sized {
    /// `floor(self * num / denom)`, `None` on overflow or zero denominator.
    fn mul_div_floor(self, num: Self, denom: Self) -> Option<Self>;
    /// `ceil(self * num / denom)`, `None` on overflow or zero denominator.
    fn mul_div_ceil(self, num: Self, denom: Self) -> Option<Self>;
}

impl MulDiv for u64 {
    fn mul_div_floor(self, num: Self, denom: Self) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let r = u128::from(self) * u128::from(num) / u128::from(denom);
        u64::try_from(r).ok()
    }

    fn mul_div_ceil(self, num: Self, denom: Self) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let denom = u128::from(denom);
        let r = (u128::from(self) * u128::from(num)).div_ceil(denom);
        u64::try_from(r).ok()
    }
}

impl MulDiv for U256 {
    fn mul_div_floor(self, num: Self, denom: Self) -> Option<Self> {
        if denom.is_zero() {
            return None;
        }
        narrow_u512(widen(self) * widen(num) / widen(denom))
    }

    fn mul_div_ceil(self, num: Self, denom: Self) -> Option<Self> {
        if denom.is_zero() {
            return None;
        }
        let (quotient, remainder) = (widen(self) * widen(num)).div_mod(widen(denom));
        let quotient = if remainder.is_zero() {
            quotient
        } else {
            quotient + U512::one()
        };
        narrow_u512(quotient)
    }
}

/// `ceil(numerator / denominator)`, `None` when the denominator is zero.
#[must_use]
pub fn div_rounding_up(numerator: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let (quotient, remainder) = numerator.div_mod(denominator);
    if remainder.is_zero() {
        Some(quotient)
    } else {
        quotient.checked_add(U256::one())
    }
}

/// Zero-extends a U256 into a U512.
#[must_use]
pub fn widen(value: U256) -> U512 {
    let mut words = [0u64; 8];
    words[..4].copy_from_slice(&value.0);
    U512(words)
}

/// Truncating narrow from U512, `None` if any high word is set.
#[must_use]
pub fn narrow_u512(value: U512) -> Option<U256> {
    if value.bits() > 256 {
        return None;
    }
    let w = value.0;
    Some(U256([w[0], w[1], w[2], w[3]]))
}

/// Checked U256 → u128 conversion.
#[must_use]
pub fn u256_to_u128(value: U256) -> Option<u128> {
    (value.bits() <= 128).then(|| value.low_u128())
}

/// Checked U256 → u64 conversion.
#[must_use]
pub fn u256_to_u64(value: U256) -> Option<u64> {
    (value.bits() <= 64).then(|| value.low_u64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u64_mul_div_rounding() {
        assert_eq!(10u64.mul_div_floor(1, 3), Some(3));
        assert_eq!(10u64.mul_div_ceil(1, 3), Some(4));
        assert_eq!(9u64.mul_div_ceil(1, 3), Some(3));
        assert_eq!(1u64.mul_div_floor(1, 0), None);
        // Intermediate exceeds u64 but the quotient fits.
        assert_eq!(u64::MAX.mul_div_floor(4, 8), Some(u64::MAX / 2));
        assert_eq!(u64::MAX.mul_div_floor(2, 1), None);
    }

    #[test]
    fn test_u256_mul_div_uses_wide_intermediate() {
        let big = U256::MAX;
        assert_eq!(big.mul_div_floor(U256::from(2), U256::from(2)), Some(big));
        assert_eq!(big.mul_div_floor(U256::from(3), U256::from(2)), None);
        assert_eq!(
            U256::from(7).mul_div_ceil(U256::from(3), U256::from(2)),
            Some(U256::from(11))
        );
        assert_eq!(U256::from(7).mul_div_ceil(U256::one(), U256::zero()), None);
    }

    #[test]
    fn test_div_rounding_up() {
        assert_eq!(div_rounding_up(U256::from(6), U256::from(3)), Some(U256::from(2)));
        assert_eq!(div_rounding_up(U256::from(7), U256::from(3)), Some(U256::from(3)));
        assert_eq!(div_rounding_up(U256::from(7), U256::zero()), None);
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(u256_to_u128(U256::from(u128::MAX)), Some(u128::MAX));
        assert_eq!(u256_to_u128(U256::from(u128::MAX) + U256::one()), None);
        assert_eq!(u256_to_u64(U256::from(u64::MAX)), Some(u64::MAX));
        assert_eq!(u256_to_u64(U256::from(u64::MAX) + U256::one()), None);
        assert_eq!(narrow_u512(widen(U256::MAX)), Some(U256::MAX));
    }
}
