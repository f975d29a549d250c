//! Flash-swap callback target.

use crate::domain::{Address, Amount};
use crate::error::PairError;
use crate::pair::Pair;

/// Receiver of a flash swap.
///
/// Invoked synchronously by [`Pair::swap`] after the requested outputs have
/// been transferred optimistically and before the constant-product check,
/// whenever the caller supplies non-empty callback data.  The callee may do
/// anything, including calling back into the pair; guarded entry points
/// reject such calls with [`PairError::ReentrantCall`].  Repayment happens
/// by transferring assets into the pair's address on the asset ledgers.
///
/// Returning an error aborts the swap and rolls back every change it made;
/// the error is surfaced to the swap caller unchanged.
pub trait SwapCallee {
    /// Handles a flash swap.
    ///
    /// # Errors
    ///
    /// Any error aborts the enclosing swap.
    fn on_swap(
        &self,
        pair: &Pair,
        initiator: &Address,
        amount_a_out: Amount,
        amount_b_out: Amount,
        data: &[u8],
    ) -> Result<(), PairError>;
}
