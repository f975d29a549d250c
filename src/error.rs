//! Unified error type for the pair engine.
//!
//! Every fallible operation in the crate returns [`PairError`].  Each
//! variant is fatal to the operation that produced it: the pair rolls back
//! every internal and journaled external change before the error reaches
//! the caller.

use thiserror::Error;

use crate::domain::Address;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, PairError>;

/// Errors produced by the pair engine and its helpers.
///
/// Variants fall into four groups:
///
/// - **Preconditions** — zero or insufficient amounts, bad recipients,
///   expired or invalid permit signatures, missing balances/allowances.
/// - **Invariants** — [`PairError::KInvariantViolation`],
///   [`PairError::ReserveOverflow`].
/// - **Locking** — [`PairError::ReentrantCall`].
/// - **External dependencies** — [`PairError::TransferFailed`],
///   [`PairError::CallbackFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairError {
    /// A guarded entry point was called while another one was running.
    #[error("reentrant call rejected: pair is locked")]
    ReentrantCall,

    /// An actual balance does not fit in 112 bits.
    #[error("reserve overflow: balance exceeds 112 bits")]
    ReserveOverflow,

    /// A deposit would mint zero shares.
    #[error("insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    /// A withdrawal would pay out zero of either asset.
    #[error("insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    /// A swap requested no output at all.
    #[error("insufficient output amount")]
    InsufficientOutputAmount,

    /// A swap received no input on either side.
    #[error("insufficient input amount")]
    InsufficientInputAmount,

    /// A quote was requested for a zero amount.
    #[error("insufficient amount")]
    InsufficientAmount,

    /// A swap would drain a reserve, or a reserve needed for pricing is zero.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// The swap recipient is one of the pair's own assets.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(Address),

    /// The fee-adjusted constant product decreased.
    #[error("constant product invariant violated")]
    KInvariantViolation,

    /// An asset ledger explicitly reported a failed transfer.
    #[error("transfer of asset {asset} failed")]
    TransferFailed {
        /// Identifier of the asset ledger that refused the transfer.
        asset: Address,
    },

    /// The flash-swap callback failed or could not be invoked.
    #[error("swap callback failed: {0}")]
    CallbackFailed(String),

    /// The permit deadline is in the past.
    #[error("permit signature expired")]
    SignatureExpired,

    /// The permit signature does not match the owner.
    #[error("invalid permit signature")]
    InvalidSignature,

    /// A share transfer or burn exceeds the holder's balance.
    #[error("insufficient share balance")]
    InsufficientBalance,

    /// A delegated share transfer exceeds the remaining allowance.
    #[error("insufficient share allowance")]
    InsufficientAllowance,

    /// Token identifiers are invalid (identical or zero).
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),

    /// Configuration parameters are invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Two oracle observations share the same timestamp.
    #[error("oracle window is empty: observations share a timestamp")]
    OracleWindowEmpty,

    /// Arithmetic overflow.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Arithmetic underflow.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
}
