//! Checked arithmetic trait for domain wrapper types.
//!
//! The [`CheckedArithmetic`] trait lifts the `Option`-returning checked
//! methods of [`Amount`] and [`Liquidity`] into [`Result`]s carrying a
//! specific [`PairError`] variant, so pair code can use `?` throughout.
//!
//! # Examples
//!
//! ```
//! use pair_amm::domain::Amount;
//! use pair_amm::math::CheckedArithmetic;
//!
//! let a = Amount::new(100);
//! let b = Amount::new(200);
//! assert_eq!(a.safe_add(&b), Ok(Amount::new(300)));
//! assert!(a.safe_sub(&b).is_err());
//! ```

use crate::domain::{Amount, Liquidity};
use crate::error::PairError;

/// Fallible arithmetic for domain wrapper types.
///
/// # Contract
///
/// - **No panics** — all error conditions produce `Err`.
/// - **No saturation** — saturation hides bugs; errors propagate instead.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::Overflow`] if the result exceeds `u128`.
    fn safe_add(&self, other: &Self) -> Result<Self, PairError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::Underflow`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self, PairError>;
}

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, PairError> {
        self.checked_add(other)
            .ok_or(PairError::Overflow("amount addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, PairError> {
        self.checked_sub(other)
            .ok_or(PairError::Underflow("amount subtraction underflow"))
    }
}

impl CheckedArithmetic for Liquidity {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, PairError> {
        self.checked_add(other)
            .ok_or(PairError::Overflow("liquidity addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, PairError> {
        self.checked_sub(other)
            .ok_or(PairError::Underflow("liquidity subtraction underflow"))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    mod amount {
        use super::*;

        #[test]
        fn add_overflow() {
            let Err(PairError::Overflow(_)) = Amount::MAX.safe_add(&Amount::new(1)) else {
                panic!("expected Overflow");
            };
        }

        #[test]
        fn sub_underflow() {
            let Err(PairError::Underflow(_)) = Amount::new(1).safe_sub(&Amount::new(2)) else {
                panic!("expected Underflow");
            };
        }

        #[test]
        fn ok_paths() {
            assert_eq!(Amount::new(7).safe_sub(&Amount::new(2)), Ok(Amount::new(5)));
        }
    }

    mod liquidity {
        use super::*;

        #[test]
        fn add_overflow() {
            let Err(PairError::Overflow(_)) = Liquidity::UNLIMITED.safe_add(&Liquidity::new(1))
            else {
                panic!("expected Overflow");
            };
        }

        #[test]
        fn sub_underflow() {
            let Err(PairError::Underflow(_)) = Liquidity::ZERO.safe_sub(&Liquidity::new(1)) else {
                panic!("expected Underflow");
            };
        }
    }
}
