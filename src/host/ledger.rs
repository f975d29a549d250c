//! Journaled in-memory asset ledger.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::domain::{Address, Amount};
use crate::error::PairError;
use crate::math::CheckedArithmetic;
use crate::traits::{AssetLedger, TransferReceipt};

/// How a [`MemoryLedger`] signals transfer outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferStyle {
    /// Returns [`TransferReceipt::Success`].
    #[default]
    Standard,
    /// Returns [`TransferReceipt::Silent`], like ledgers with no return value.
    NoReturn,
    /// Refuses every transfer with [`TransferReceipt::Failure`].
    Rejecting,
}

/// A balance change that a revert can reverse.
#[derive(Debug, Clone, Copy)]
enum Entry {
    Moved {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Minted {
        to: Address,
        amount: Amount,
    },
}

#[derive(Debug, Default)]
struct LedgerState {
    style: TransferStyle,
    balances: HashMap<Address, Amount>,
    journals: HashMap<ThreadId, Vec<Vec<Entry>>>,
}

impl LedgerState {
    fn balance(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    fn record(&mut self, entry: Entry) {
        if let Some(frame) = self
            .journals
            .get_mut(&thread::current().id())
            .and_then(|frames| frames.last_mut())
        {
            frame.push(entry);
        }
    }

    fn pop_frame(&mut self) -> Option<Vec<Entry>> {
        let id = thread::current().id();
        let frames = self.journals.get_mut(&id)?;
        let frame = frames.pop();
        if frames.is_empty() {
            self.journals.remove(&id);
        }
        frame
    }

    /// Removes up to `amount` from `holder`, returning what was removed.
    fn debit(&mut self, holder: &Address, amount: Amount) -> Amount {
        let balance = self.balance(holder);
        let taken = balance.min(amount);
        self.balances.insert(*holder, balance.saturating_sub(&taken));
        taken
    }

    fn credit(&mut self, holder: &Address, amount: Amount) {
        let balance = self.balance(holder);
        let credited = balance.checked_add(&amount).unwrap_or(Amount::MAX);
        self.balances.insert(*holder, credited);
    }

    fn undo(&mut self, entry: Entry) {
        match entry {
            Entry::Moved { from, to, amount } => {
                let taken = self.debit(&to, amount);
                self.credit(&from, taken);
            }
            Entry::Minted { to, amount } => {
                self.debit(&to, amount);
            }
        }
    }
}

/// Balances of one asset kept in process memory.
///
/// Checkpoints are kept per thread.  While a thread has one open, its
/// transfers and mints are journaled; [`AssetLedger::commit`] folds the
/// newest frame into the one below it and [`AssetLedger::revert`] reverses
/// the frame's changes newest first.  Changes made by other threads are
/// never touched by a revert.  Transfers that would overdraw the sender
/// fail without moving anything, whatever the style.
///
/// # Example
///
/// ```rust
/// use pair_amm::domain::{Address, Amount};
/// use pair_amm::host::MemoryLedger;
/// use pair_amm::traits::AssetLedger;
///
/// let ledger = MemoryLedger::new(Address::from_bytes([1u8; 32]));
/// let alice = Address::from_bytes([2u8; 32]);
/// ledger.mint_to(&alice, Amount::new(500)).expect("funded");
///
/// ledger.checkpoint();
/// ledger.transfer(&alice, &Address::from_bytes([3u8; 32]), Amount::new(200));
/// ledger.revert();
/// assert_eq!(ledger.balance_of(&alice), Amount::new(500));
/// ```
#[derive(Debug)]
pub struct MemoryLedger {
    asset: Address,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    /// Creates an empty ledger that signals success explicitly.
    #[must_use]
    pub fn new(asset: Address) -> Self {
        Self::with_style(asset, TransferStyle::Standard)
    }

    /// Creates an empty ledger with the given signalling style.
    #[must_use]
    pub fn with_style(asset: Address, style: TransferStyle) -> Self {
        Self {
            asset,
            state: Mutex::new(LedgerState {
                style,
                ..LedgerState::default()
            }),
        }
    }

    /// Changes how subsequent transfers are signalled.
    pub fn set_style(&self, style: TransferStyle) {
        self.state.lock().style = style;
    }

    /// Creates `amount` new units held by `to`.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::Overflow`] if the balance would exceed `u128`.
    pub fn mint_to(&self, to: &Address, amount: Amount) -> Result<(), PairError> {
        let mut state = self.state.lock();
        let balance = state.balance(to).safe_add(&amount)?;
        state.balances.insert(*to, balance);
        state.record(Entry::Minted { to: *to, amount });
        Ok(())
    }

    /// Number of checkpoints the calling thread has open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.state
            .lock()
            .journals
            .get(&thread::current().id())
            .map_or(0, Vec::len)
    }
}

impl AssetLedger for MemoryLedger {
    fn asset(&self) -> Address {
        self.asset
    }

    fn balance_of(&self, holder: &Address) -> Amount {
        self.state.lock().balance(holder)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> TransferReceipt {
        let mut state = self.state.lock();
        let receipt = match state.style {
            TransferStyle::Standard => TransferReceipt::Success,
            TransferStyle::NoReturn => TransferReceipt::Silent,
            TransferStyle::Rejecting => return TransferReceipt::Failure,
        };

        let from_balance = state.balance(from);
        let Some(remaining) = from_balance.checked_sub(&amount) else {
            debug!(asset = %self.asset, %from, %amount, "transfer exceeds balance");
            return TransferReceipt::Failure;
        };
        state.balances.insert(*from, remaining);
        let to_balance = state.balance(to);
        let Some(credited) = to_balance.checked_add(&amount) else {
            state.balances.insert(*from, from_balance);
            return TransferReceipt::Failure;
        };
        state.balances.insert(*to, credited);
        state.record(Entry::Moved {
            from: *from,
            to: *to,
            amount,
        });
        receipt
    }

    fn checkpoint(&self) {
        self.state
            .lock()
            .journals
            .entry(thread::current().id())
            .or_default()
            .push(Vec::new());
    }

    fn commit(&self) {
        let mut state = self.state.lock();
        let Some(frame) = state.pop_frame() else {
            warn!(asset = %self.asset, "commit without checkpoint");
            return;
        };
        if let Some(parent) = state
            .journals
            .get_mut(&thread::current().id())
            .and_then(|frames| frames.last_mut())
        {
            parent.extend(frame);
        }
    }

    fn revert(&self) {
        let mut state = self.state.lock();
        let Some(frame) = state.pop_frame() else {
            warn!(asset = %self.asset, "revert without checkpoint");
            return;
        };
        for entry in frame.into_iter().rev() {
            state.undo(entry);
        }
    }
}
