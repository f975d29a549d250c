//! 256-bit intermediate arithmetic.
//!
//! Products of two `u128` values (`reserve × reserve`, `amount × supply`)
//! do not fit in `u128`, so every such product is computed in [`U256`] and
//! narrowed back with an explicit check.

#![allow(clippy::manual_div_ceil, clippy::assign_op_pattern, clippy::ptr_offset_with_cast)]

use uint::construct_uint;

use crate::error::PairError;

construct_uint! {
    /// 256-bit unsigned integer for intermediate products and price accumulators.
    pub struct U256(4);
}

/// Widens a `u128` into a [`U256`].
#[inline]
#[must_use]
pub fn widen(value: u128) -> U256 {
    U256::from(value)
}

/// Narrows a [`U256`] into a `u128`, returning `None` if it does not fit.
#[inline]
#[must_use]
pub fn narrow(value: U256) -> Option<u128> {
    if value.bits() > 128 {
        return None;
    }
    Some(value.low_u128())
}

/// Computes `floor(a × b / denominator)` with a 256-bit intermediate.
///
/// # Errors
///
/// - [`PairError::DivisionByZero`] if `denominator` is zero.
/// - [`PairError::Overflow`] if the quotient does not fit in `u128`.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, PairError> {
    if denominator == 0 {
        return Err(PairError::DivisionByZero);
    }
    // a, b < 2^128 so the product fits in 256 bits.
    let product = widen(a) * widen(b);
    narrow(product / widen(denominator)).ok_or(PairError::Overflow("mul_div quotient exceeds u128"))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn narrow_round_trip() {
        assert_eq!(narrow(widen(u128::MAX)), Some(u128::MAX));
        assert_eq!(narrow(widen(u128::MAX) + U256::one()), None);
    }

    #[test]
    fn mul_div_handles_wide_products() {
        let Ok(q) = mul_div(u128::MAX, u128::MAX, u128::MAX) else {
            panic!("expected Ok");
        };
        assert_eq!(q, u128::MAX);
    }

    #[test]
    fn mul_div_floors() {
        assert_eq!(mul_div(10, 1, 3), Ok(3));
    }

    #[test]
    fn mul_div_rejects_zero_denominator() {
        assert_eq!(mul_div(1, 1, 0), Err(PairError::DivisionByZero));
    }

    #[test]
    fn mul_div_rejects_oversized_quotient() {
        assert!(matches!(mul_div(u128::MAX, 2, 1), Err(PairError::Overflow(_))));
    }
}
