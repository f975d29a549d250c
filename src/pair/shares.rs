//! Fungible accounting for the pair's own share token.
//!
//! `mint` and `burn` are crate-internal: only the invariant engine issues or
//! destroys shares.  `transfer`, `approve` and `transfer_from` back the
//! public share API on [`Pair`](super::Pair).  Every mutation returns the
//! events it produced so the caller decides when they become visible.

use std::collections::HashMap;

use crate::domain::{Address, Liquidity};
use crate::error::PairError;
use crate::events::PairEvent;
use crate::math::CheckedArithmetic;

/// Compensating action for one share-ledger change.
///
/// Undo entries are deltas, not snapshots: applying one leaves changes made
/// to other holders in the meantime intact.  Reversals clamp to what the
/// holder still has, so the balances keep summing to the supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShareUndo {
    Issued { to: Address, value: Liquidity },
    Destroyed { from: Address, value: Liquidity },
    Moved { from: Address, to: Address, value: Liquidity },
    Allowance { owner: Address, spender: Address, previous: Liquidity },
    Nonce { owner: Address, previous: u64 },
}

/// Balances, supply, allowances and permit nonces.
///
/// Invariant: the sum of all balances equals `total_supply`.  Minting
/// checks the supply first; every balance is bounded by the supply, so a
/// successful supply update implies the balance update cannot overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareLedger {
    total_supply: Liquidity,
    balances: HashMap<Address, Liquidity>,
    allowances: HashMap<(Address, Address), Liquidity>,
    nonces: HashMap<Address, u64>,
}

impl ShareLedger {
    /// Total shares in existence.
    #[must_use]
    pub const fn total_supply(&self) -> Liquidity {
        self.total_supply
    }

    /// Shares held by `holder`.
    #[must_use]
    pub fn balance_of(&self, holder: &Address) -> Liquidity {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    /// Remaining quota `spender` may move on behalf of `owner`.
    #[must_use]
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Liquidity {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Next permit nonce for `owner`.
    #[must_use]
    pub fn nonce(&self, owner: &Address) -> u64 {
        self.nonces.get(owner).copied().unwrap_or_default()
    }

    /// Issues `value` new shares to `to`.
    pub(crate) fn mint(&mut self, to: &Address, value: Liquidity) -> Result<PairEvent, PairError> {
        self.total_supply = self.total_supply.safe_add(&value)?;
        let balance = self.balance_of(to).safe_add(&value)?;
        self.balances.insert(*to, balance);
        Ok(PairEvent::Transfer {
            from: Address::ZERO,
            to: *to,
            value,
        })
    }

    /// Destroys `value` shares held by `from`.
    pub(crate) fn burn(&mut self, from: &Address, value: Liquidity) -> Result<PairEvent, PairError> {
        let balance = self
            .balance_of(from)
            .checked_sub(&value)
            .ok_or(PairError::InsufficientBalance)?;
        self.total_supply = self.total_supply.safe_sub(&value)?;
        self.balances.insert(*from, balance);
        Ok(PairEvent::Transfer {
            from: *from,
            to: Address::ZERO,
            value,
        })
    }

    /// Moves `value` shares from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::InsufficientBalance`] if `from` holds too few.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        value: Liquidity,
    ) -> Result<PairEvent, PairError> {
        let from_balance = self
            .balance_of(from)
            .checked_sub(&value)
            .ok_or(PairError::InsufficientBalance)?;
        self.balances.insert(*from, from_balance);
        // bounded by total supply
        let to_balance = self.balance_of(to).safe_add(&value)?;
        self.balances.insert(*to, to_balance);
        Ok(PairEvent::Transfer {
            from: *from,
            to: *to,
            value,
        })
    }

    /// Sets the allowance of `spender` over `owner`'s shares.
    pub fn approve(&mut self, owner: &Address, spender: &Address, value: Liquidity) -> PairEvent {
        self.allowances.insert((*owner, *spender), value);
        PairEvent::Approval {
            owner: *owner,
            spender: *spender,
            value,
        }
    }

    /// Moves `value` shares from `from` to `to` on behalf of `spender`.
    ///
    /// An allowance of [`Liquidity::UNLIMITED`] is never decremented.
    ///
    /// # Errors
    ///
    /// - [`PairError::InsufficientAllowance`] if the allowance is too small.
    /// - [`PairError::InsufficientBalance`] if `from` holds too few shares.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        value: Liquidity,
    ) -> Result<PairEvent, PairError> {
        let allowance = self.allowance(from, spender);
        let remaining = if allowance == Liquidity::UNLIMITED {
            allowance
        } else {
            allowance
                .checked_sub(&value)
                .ok_or(PairError::InsufficientAllowance)?
        };
        let event = self.transfer(from, to, value)?;
        self.allowances.insert((*from, *spender), remaining);
        Ok(event)
    }

    /// Consumes and returns the current nonce of `owner`.
    pub(crate) fn use_nonce(&mut self, owner: &Address) -> u64 {
        let nonce = self.nonce(owner);
        self.nonces.insert(*owner, nonce.wrapping_add(1));
        nonce
    }

    /// Applies a compensating action recorded for an earlier change.
    pub(crate) fn undo(&mut self, entry: ShareUndo) {
        match entry {
            ShareUndo::Issued { to, value } => {
                let taken = self.debit(&to, value.get());
                self.total_supply = Liquidity::new(self.total_supply.get().saturating_sub(taken));
            }
            ShareUndo::Destroyed { from, value } => {
                self.credit(&from, value.get());
                self.total_supply = Liquidity::new(self.total_supply.get().saturating_add(value.get()));
            }
            ShareUndo::Moved { from, to, value } => {
                let taken = self.debit(&to, value.get());
                self.credit(&from, taken);
            }
            ShareUndo::Allowance {
                owner,
                spender,
                previous,
            } => {
                self.allowances.insert((owner, spender), previous);
            }
            ShareUndo::Nonce { owner, previous } => {
                self.nonces.insert(owner, previous);
            }
        }
    }

    /// Removes up to `value` from `holder`, returning what was removed.
    fn debit(&mut self, holder: &Address, value: u128) -> u128 {
        let balance = self.balance_of(holder).get();
        let taken = balance.min(value);
        self.balances.insert(*holder, Liquidity::new(balance - taken));
        taken
    }

    fn credit(&mut self, holder: &Address, value: u128) {
        let balance = self.balance_of(holder).get().saturating_add(value);
        self.balances.insert(*holder, Liquidity::new(balance));
    }

    /// Sum of all balances; equals `total_supply` at every observation point.
    #[must_use]
    pub fn sum_of_balances(&self) -> u128 {
        self.balances.values().map(Liquidity::get).sum()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 32])
    }

    fn funded(holder: Address, value: u128) -> ShareLedger {
        let mut ledger = ShareLedger::default();
        let Ok(_) = ledger.mint(&holder, Liquidity::new(value)) else {
            panic!("mint failed");
        };
        ledger
    }

    #[test]
    fn mint_emits_transfer_from_zero() {
        let mut ledger = ShareLedger::default();
        let Ok(event) = ledger.mint(&addr(1), Liquidity::new(10)) else {
            panic!("expected Ok");
        };
        assert_eq!(
            event,
            PairEvent::Transfer {
                from: Address::ZERO,
                to: addr(1),
                value: Liquidity::new(10)
            }
        );
        assert_eq!(ledger.total_supply(), Liquidity::new(10));
        assert_eq!(ledger.sum_of_balances(), 10);
    }

    #[test]
    fn mint_overflow_leaves_ledger_untouched() {
        let mut ledger = funded(addr(1), u128::MAX);
        let before = ledger.clone();
        assert!(matches!(
            ledger.mint(&addr(2), Liquidity::new(1)),
            Err(PairError::Overflow(_))
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn burn_reduces_supply() {
        let mut ledger = funded(addr(1), 100);
        let Ok(_) = ledger.burn(&addr(1), Liquidity::new(40)) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.total_supply(), Liquidity::new(60));
        assert_eq!(ledger.balance_of(&addr(1)), Liquidity::new(60));
    }

    #[test]
    fn burn_more_than_balance_rejected() {
        let mut ledger = funded(addr(1), 100);
        assert_eq!(
            ledger.burn(&addr(1), Liquidity::new(101)),
            Err(PairError::InsufficientBalance)
        );
    }

    #[test]
    fn transfer_moves_balance() {
        let mut ledger = funded(addr(1), 100);
        let Ok(_) = ledger.transfer(&addr(1), &addr(2), Liquidity::new(30)) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.balance_of(&addr(1)), Liquidity::new(70));
        assert_eq!(ledger.balance_of(&addr(2)), Liquidity::new(30));
        assert_eq!(ledger.sum_of_balances(), 100);
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let mut ledger = funded(addr(1), 100);
        let Ok(_) = ledger.transfer(&addr(1), &addr(1), Liquidity::new(30)) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.balance_of(&addr(1)), Liquidity::new(100));
    }

    #[test]
    fn transfer_from_decrements_allowance() {
        let mut ledger = funded(addr(1), 100);
        ledger.approve(&addr(1), &addr(3), Liquidity::new(50));
        let Ok(_) = ledger.transfer_from(&addr(3), &addr(1), &addr(2), Liquidity::new(20)) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.allowance(&addr(1), &addr(3)), Liquidity::new(30));
        assert_eq!(ledger.balance_of(&addr(2)), Liquidity::new(20));
    }

    #[test]
    fn unlimited_allowance_is_not_decremented() {
        let mut ledger = funded(addr(1), 100);
        ledger.approve(&addr(1), &addr(3), Liquidity::UNLIMITED);
        let Ok(_) = ledger.transfer_from(&addr(3), &addr(1), &addr(2), Liquidity::new(20)) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.allowance(&addr(1), &addr(3)), Liquidity::UNLIMITED);
    }

    #[test]
    fn transfer_from_without_allowance_rejected() {
        let mut ledger = funded(addr(1), 100);
        assert_eq!(
            ledger.transfer_from(&addr(3), &addr(1), &addr(2), Liquidity::new(1)),
            Err(PairError::InsufficientAllowance)
        );
    }

    #[test]
    fn failed_transfer_from_keeps_allowance() {
        let mut ledger = funded(addr(1), 10);
        ledger.approve(&addr(1), &addr(3), Liquidity::new(50));
        assert_eq!(
            ledger.transfer_from(&addr(3), &addr(1), &addr(2), Liquidity::new(20)),
            Err(PairError::InsufficientBalance)
        );
        assert_eq!(ledger.allowance(&addr(1), &addr(3)), Liquidity::new(50));
    }

    #[test]
    fn undo_reverses_each_change() {
        let mut ledger = funded(addr(1), 100);
        let before = ledger.clone();

        let Ok(_) = ledger.mint(&addr(2), Liquidity::new(5)) else {
            panic!("expected Ok");
        };
        let Ok(_) = ledger.transfer(&addr(1), &addr(3), Liquidity::new(20)) else {
            panic!("expected Ok");
        };
        let Ok(_) = ledger.burn(&addr(1), Liquidity::new(10)) else {
            panic!("expected Ok");
        };
        ledger.approve(&addr(1), &addr(3), Liquidity::new(7));
        ledger.use_nonce(&addr(1));

        for entry in [
            ShareUndo::Nonce { owner: addr(1), previous: 0 },
            ShareUndo::Allowance { owner: addr(1), spender: addr(3), previous: Liquidity::ZERO },
            ShareUndo::Destroyed { from: addr(1), value: Liquidity::new(10) },
            ShareUndo::Moved { from: addr(1), to: addr(3), value: Liquidity::new(20) },
            ShareUndo::Issued { to: addr(2), value: Liquidity::new(5) },
        ] {
            ledger.undo(entry);
        }
        assert_eq!(ledger.total_supply(), before.total_supply());
        assert_eq!(ledger.balance_of(&addr(1)), Liquidity::new(100));
        assert_eq!(ledger.balance_of(&addr(2)), Liquidity::ZERO);
        assert_eq!(ledger.balance_of(&addr(3)), Liquidity::ZERO);
        assert_eq!(ledger.allowance(&addr(1), &addr(3)), Liquidity::ZERO);
        assert_eq!(ledger.nonce(&addr(1)), 0);
    }

    #[test]
    fn undo_keeps_unrelated_moves() {
        let mut ledger = funded(addr(1), 100);
        let Ok(_) = ledger.transfer(&addr(1), &addr(2), Liquidity::new(30)) else {
            panic!("expected Ok");
        };
        // made by someone else after the move being undone
        let Ok(_) = ledger.transfer(&addr(1), &addr(4), Liquidity::new(50)) else {
            panic!("expected Ok");
        };
        ledger.undo(ShareUndo::Moved {
            from: addr(1),
            to: addr(2),
            value: Liquidity::new(30),
        });
        assert_eq!(ledger.balance_of(&addr(1)), Liquidity::new(50));
        assert_eq!(ledger.balance_of(&addr(4)), Liquidity::new(50));
        assert_eq!(ledger.sum_of_balances(), 100);
    }

    #[test]
    fn undo_clamps_to_remaining_balance() {
        let mut ledger = funded(addr(1), 100);
        let Ok(_) = ledger.transfer(&addr(1), &addr(2), Liquidity::new(30)) else {
            panic!("expected Ok");
        };
        let Ok(_) = ledger.transfer(&addr(2), &addr(5), Liquidity::new(20)) else {
            panic!("expected Ok");
        };
        ledger.undo(ShareUndo::Moved {
            from: addr(1),
            to: addr(2),
            value: Liquidity::new(30),
        });
        assert_eq!(ledger.balance_of(&addr(1)), Liquidity::new(80));
        assert_eq!(ledger.sum_of_balances(), ledger.total_supply().get());
    }

    #[test]
    fn nonces_increase() {
        let mut ledger = ShareLedger::default();
        assert_eq!(ledger.use_nonce(&addr(1)), 0);
        assert_eq!(ledger.use_nonce(&addr(1)), 1);
        assert_eq!(ledger.nonce(&addr(1)), 2);
        assert_eq!(ledger.nonce(&addr(2)), 0);
    }
}
