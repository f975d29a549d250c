//! Integer square root.

use super::wide::{narrow, U256};

/// Largest integer whose square does not exceed `n` (Babylonian method).
///
/// The square root of any 256-bit value fits in 128 bits, so the result is
/// returned as `u128`.
///
/// # Examples
///
/// ```
/// use pair_amm::math::{isqrt, U256};
///
/// assert_eq!(isqrt(U256::from(4_000_000u64)), 2_000);
/// assert_eq!(isqrt(U256::from(15u64)), 3);
/// ```
#[must_use]
pub fn isqrt(n: U256) -> u128 {
    if n.is_zero() {
        return 0;
    }
    if n <= U256::from(3u8) {
        return 1;
    }
    let mut z = n;
    let mut x = (n >> 1usize) + U256::one();
    while x < z {
        z = x;
        x = (n / x + x) >> 1usize;
    }
    // z <= 2^128 - 1 for every 256-bit n.
    narrow(z).unwrap_or(u128::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values() {
        let expected = [0u128, 1, 1, 1, 2, 2, 2, 2, 2, 3, 3];
        for (n, want) in expected.iter().enumerate() {
            assert_eq!(isqrt(U256::from(n as u64)), *want, "isqrt({n})");
        }
    }

    #[test]
    fn perfect_squares() {
        assert_eq!(isqrt(U256::from(1_000_000u64)), 1_000);
        assert_eq!(isqrt(U256::from(4_000_000u64)), 2_000);
    }

    #[test]
    fn floors_non_squares() {
        assert_eq!(isqrt(U256::from(999_999u64)), 999);
    }

    #[test]
    fn max_input_fits_u128() {
        assert_eq!(isqrt(U256::MAX), u128::MAX);
    }

    #[test]
    fn product_of_max_reserves() {
        let r = U256::from((1u128 << 112) - 1);
        assert_eq!(isqrt(r * r), (1u128 << 112) - 1);
    }
}
