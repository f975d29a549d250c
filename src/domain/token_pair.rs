//! Canonically ordered pair of distinct asset identifiers.

use serde::{Deserialize, Serialize};

use super::Address;
use crate::error::PairError;

/// An ordered pair of distinct asset ledgers, sorted by address.
///
/// The canonical ordering guarantees `token_a < token_b`, so each unordered
/// pair of assets maps to exactly one pool.
///
/// # Examples
///
/// ```
/// use pair_amm::domain::{Address, TokenPair};
///
/// let usdc = Address::from_bytes([1u8; 32]);
/// let weth = Address::from_bytes([2u8; 32]);
///
/// // Order is enforced automatically:
/// let pair = TokenPair::new(weth, usdc).expect("distinct tokens");
/// assert_eq!(pair.token_a(), usdc);
/// assert_eq!(pair.token_b(), weth);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    token_a: Address,
    token_b: Address,
}

impl TokenPair {
    /// Creates a new canonically ordered `TokenPair`.
    ///
    /// # Errors
    ///
    /// - [`PairError::InvalidToken`] if both identifiers are equal.
    /// - [`PairError::InvalidToken`] if either identifier is the zero address.
    pub fn new(token_x: Address, token_y: Address) -> Result<Self, PairError> {
        if token_x == token_y {
            return Err(PairError::InvalidToken(
                "token pair requires two distinct addresses",
            ));
        }

        let (token_a, token_b) = if token_x < token_y {
            (token_x, token_y)
        } else {
            (token_y, token_x)
        };

        if token_a.is_zero() {
            return Err(PairError::InvalidToken("zero address is not an asset"));
        }

        Ok(Self { token_a, token_b })
    }

    /// Returns the first asset (lower address).
    #[must_use]
    pub const fn token_a(&self) -> Address {
        self.token_a
    }

    /// Returns the second asset (higher address).
    #[must_use]
    pub const fn token_b(&self) -> Address {
        self.token_b
    }

    /// Returns `true` if `token` is one of the two assets.
    #[must_use]
    pub fn contains(&self, token: &Address) -> bool {
        self.token_a == *token || self.token_b == *token
    }

    /// Returns the counterpart of `token` in this pair.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::InvalidToken`] if `token` is not in the pair.
    pub fn other(&self, token: &Address) -> Result<Address, PairError> {
        if *token == self.token_a {
            Ok(self.token_b)
        } else if *token == self.token_b {
            Ok(self.token_a)
        } else {
            Err(PairError::InvalidToken("token is not part of this pair"))
        }
    }
}
