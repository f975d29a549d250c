//! External asset ledger abstraction.
//!
//! A pair never owns the assets it trades: each asset lives on an external
//! ledger that the pair can query for balances and instruct to move funds.
//! Ledgers are shared with every other holder of the asset, so the pair
//! treats them as untrusted and re-reads balances after every interaction.
//!
//! # Success signalling
//!
//! Ledgers disagree on how to report a successful transfer: some return an
//! explicit `true`, some return nothing at all.  [`TransferReceipt`] models
//! the three observable outcomes; only [`TransferReceipt::Failure`] is an
//! error.
//!
//! # Journaling
//!
//! Pair operations must be atomic across the ledgers they touch.  The pair
//! calls [`AssetLedger::checkpoint`] when a guarded operation starts and
//! exactly one of [`AssetLedger::commit`] / [`AssetLedger::revert`] when it
//! ends.  Checkpoints nest: a flash-swap callback may itself run guarded
//! operations on other pairs sharing the same ledger, and the outer revert
//! must then undo the inner, already committed, changes as well.  A revert
//! undoes only what the reverting caller's thread did since its
//! checkpoint; concurrent callers keep their transfers.

use crate::domain::{Address, Amount};

/// Outcome reported by an asset ledger for a transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferReceipt {
    /// The ledger moved the funds and returned an explicit `true`.
    Success,
    /// The ledger moved the funds and returned no value.
    Silent,
    /// The ledger returned `false` or raised an error.
    Failure,
}

impl TransferReceipt {
    /// Returns `true` unless the ledger explicitly reported failure.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        !matches!(self, Self::Failure)
    }
}

/// A fungible asset ledger the pair can read from and transfer out of.
///
/// Implementations use interior mutability: the same ledger is shared by
/// the pair, traders, and flash-swap callbacks.
pub trait AssetLedger: Send + Sync {
    /// Identifier of the asset this ledger manages.
    fn asset(&self) -> Address;

    /// Balance held by `holder`; absent holders have zero.
    fn balance_of(&self, holder: &Address) -> Amount;

    /// Moves `amount` from `from` to `to`.
    ///
    /// `from` is the identity of the caller as authenticated by the host.
    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> TransferReceipt;

    /// Opens a nested checkpoint.
    fn checkpoint(&self);

    /// Discards the innermost checkpoint, keeping every change made since.
    fn commit(&self);

    /// Restores the state captured by the innermost checkpoint.
    fn revert(&self);
}
