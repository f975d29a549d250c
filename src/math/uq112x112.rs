//! Binary fixed-point prices with 112 fractional bits.
//!
//! A price is the ratio of two reserves, each below 2^112.  Encoding the
//! numerator as `y << 112` and truncating-dividing by the denominator gives
//! a value below 2^224 that adds up across time intervals without any
//! rounding drift: every accumulation truncates exactly once.
//!
//! | Aspect | Value |
//! |--------|-------|
//! | Integer bits | 112 |
//! | Fractional bits | 112 |
//! | Backing type | [`U256`] |
//! | Resolution | 2^−112 |

use core::fmt;

use super::wide::{narrow, widen, U256};

/// Number of fractional bits.
pub const RESOLUTION: usize = 112;

/// An unsigned fixed-point number with 112 integer and 112 fractional bits.
///
/// # Examples
///
/// ```
/// use pair_amm::math::Uq112x112;
///
/// // price of 1 unit of A in B when reserves are (1_000, 2_000)
/// let price = Uq112x112::encode(2_000).uqdiv(1_000).expect("non-zero");
/// assert_eq!(price.mul_decode(10).expect("fits"), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uq112x112(U256);

impl Uq112x112 {
    /// Zero.
    pub const ZERO: Self = Self(U256([0, 0, 0, 0]));

    /// Encodes an integer as a fixed-point value.
    ///
    /// Callers pass reserves, which are always below 2^112, so the shifted
    /// value never loses bits.
    #[must_use]
    pub fn encode(value: u128) -> Self {
        Self(widen(value) << RESOLUTION)
    }

    /// Wraps a raw 256-bit representation (e.g. an accumulator difference).
    #[must_use]
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Returns the raw 256-bit representation.
    #[must_use]
    pub const fn raw(&self) -> U256 {
        self.0
    }

    /// Divides by an integer, truncating.  Returns `None` if `divisor` is zero.
    #[must_use]
    pub fn uqdiv(&self, divisor: u128) -> Option<Self> {
        if divisor == 0 {
            return None;
        }
        Some(Self(self.0 / widen(divisor)))
    }

    /// Multiplies by an elapsed duration, wrapping modulo 2^256.
    ///
    /// Used to integrate a price over time; accumulator consumers always
    /// difference two samples, so wraparound is harmless.
    #[must_use]
    pub fn wrapping_mul_elapsed(&self, elapsed: u32) -> U256 {
        self.0.overflowing_mul(U256::from(elapsed)).0
    }

    /// Multiplies by an integer amount and truncates the fractional part.
    ///
    /// Returns `None` if the product overflows 256 bits or the integer
    /// result does not fit in `u128`.
    #[must_use]
    pub fn mul_decode(&self, amount: u128) -> Option<u128> {
        let product = self.0.checked_mul(widen(amount))?;
        narrow(product >> RESOLUTION)
    }

    /// Lossy conversion for display and diagnostics.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        let int = self.0 >> RESOLUTION;
        let frac = self.0 - (int << RESOLUTION);
        let int_f = narrow(int).map_or(f64::INFINITY, |v| v as f64);
        // keep the top 64 of the 112 fractional bits
        let frac_f = (frac >> (RESOLUTION - 64)).low_u64() as f64 / 18_446_744_073_709_551_616.0;
        int_f + frac_f
    }
}

impl fmt::Display for Uq112x112 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}
