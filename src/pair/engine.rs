//! Mint, burn, swap and forced reconciliation.
//!
//! # Swap check (fee 0.3%)
//!
//! With `in_x = max(0, balance_x − (reserve_x − out_x))`:
//!
//! ```text
//! (balance_a·1000 − in_a·3) × (balance_b·1000 − in_b·3) ≥ reserve_a × reserve_b × 1000²
//! ```
//!
//! The fee is charged on inputs only, so a flash swap that returns the
//! borrowed asset pays 0.3% of what it returns.
//!
//! # Protocol fee
//!
//! When the registry names a recipient, one sixth of the growth in
//! `√(reserve_a × reserve_b)` since the previous liquidity event is minted
//! to it as new shares at the start of every mint and burn:
//!
//! ```text
//! shares = supply × (√k − √k_last) / (5·√k + √k_last)
//! ```

use core::cmp::min;
use std::sync::Arc;

use tracing::{debug, warn};

use super::journal::Transaction;
use super::shares::ShareUndo;
use super::transfer::safe_transfer;
use super::{journal, Pair, ReserveState, Reserves, MINIMUM_LIQUIDITY};
use crate::domain::{Address, Amount, Liquidity};
use crate::error::PairError;
use crate::events::PairEvent;
use crate::math::{isqrt, mul_div, narrow, widen, CheckedArithmetic, U256};
use crate::traits::SwapCallee;

/// Fee on swap inputs, in thousandths.
const SWAP_FEE_PER_MILLE: u16 = 3;

/// Protocol-fee shares owed before a mint or burn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FeeAccrual {
    fee_on: bool,
    mint: Option<(Address, Liquidity)>,
}

impl FeeAccrual {
    fn shares(&self) -> Liquidity {
        self.mint.map_or(Liquidity::ZERO, |(_, shares)| shares)
    }

    /// `k_last` to record once the operation's reserves are known.
    fn k_last_after(&self, reserves: &Reserves) -> U256 {
        if self.fee_on {
            reserves.product()
        } else {
            U256::zero()
        }
    }
}

impl Pair {
    /// Issues shares for assets transferred in since the last sync.
    ///
    /// The first deposit mints `√(amount_a × amount_b) − 1000` shares to
    /// `to` and locks 1000 at the zero address.  Later deposits mint the
    /// smaller of the two pro-rata amounts, so an unbalanced deposit
    /// donates its excess to existing holders.
    ///
    /// Emits `Transfer` (protocol fee, if any), `Transfer` (locked minimum,
    /// first deposit only), `Transfer`, `Sync`, `Mint`.
    ///
    /// # Errors
    ///
    /// - [`PairError::ReentrantCall`] if the pair is locked.
    /// - [`PairError::InsufficientLiquidityMinted`] if no shares would be issued.
    /// - [`PairError::ReserveOverflow`] if a balance exceeds 112 bits.
    pub fn mint(&self, caller: &Address, to: &Address) -> Result<Liquidity, PairError> {
        self.guarded("mint", |pending| {
            let state = *self.state.lock();
            let reserves = state.reserves();
            let (balance_a, balance_b) = self.balances();
            let amount_a = balance_a.safe_sub(&reserves.reserve_a)?;
            let amount_b = balance_b.safe_sub(&reserves.reserve_b)?;

            let supply = self.shares.lock().total_supply();
            let fee = self.accrue_protocol_fee(&state, supply)?;
            let supply = supply.safe_add(&fee.shares())?;

            let first_deposit = supply.is_zero();
            let liquidity = if first_deposit {
                isqrt(widen(amount_a.get()) * widen(amount_b.get()))
                    .checked_sub(MINIMUM_LIQUIDITY.get())
                    .unwrap_or(0)
            } else {
                min(
                    mul_div(amount_a.get(), supply.get(), reserves.reserve_a.get())?,
                    mul_div(amount_b.get(), supply.get(), reserves.reserve_b.get())?,
                )
            };
            if liquidity == 0 {
                return Err(PairError::InsufficientLiquidityMinted);
            }
            let liquidity = Liquidity::new(liquidity);

            let locked = if first_deposit {
                MINIMUM_LIQUIDITY
            } else {
                Liquidity::ZERO
            };
            supply.safe_add(&locked)?.safe_add(&liquidity)?;

            let synced = state.synced(
                balance_a,
                balance_b,
                reserves.reserve_a,
                reserves.reserve_b,
                self.timestamp(),
            )?;
            let next = synced.with_k_last(fee.k_last_after(&synced.reserves()));

            if let Some((recipient, fee_shares)) = fee.mint {
                pending.push(self.issue_shares(&recipient, fee_shares)?);
            }
            if first_deposit {
                pending.push(self.issue_shares(&Address::ZERO, MINIMUM_LIQUIDITY)?);
            }
            pending.push(self.issue_shares(to, liquidity)?);
            self.commit_reserves(next, pending);
            pending.push(PairEvent::Mint {
                sender: *caller,
                amount_a,
                amount_b,
            });

            debug!(pair = %self.address(), %to, %amount_a, %amount_b, %liquidity, "minted");
            Ok(liquidity)
        })
    }

    /// Redeems the shares held at the pair's own address.
    ///
    /// Pays out each asset pro rata to the pair's *actual* balances, so
    /// unsynced donations are distributed too.
    ///
    /// Emits `Transfer` (protocol fee, if any), `Transfer` (burn), `Sync`,
    /// `Burn`.
    ///
    /// # Errors
    ///
    /// - [`PairError::ReentrantCall`] if the pair is locked.
    /// - [`PairError::InsufficientLiquidityBurned`] if either payout is zero.
    /// - [`PairError::TransferFailed`] if a ledger refuses a payout.
    pub fn burn(&self, caller: &Address, to: &Address) -> Result<(Amount, Amount), PairError> {
        self.guarded("burn", |pending| {
            let pair = self.address();
            let state = *self.state.lock();
            let reserves = state.reserves();
            let (balance_a, balance_b) = self.balances();
            let (supply, liquidity) = {
                let shares = self.shares.lock();
                (shares.total_supply(), shares.balance_of(&pair))
            };

            let fee = self.accrue_protocol_fee(&state, supply)?;
            let supply = supply.safe_add(&fee.shares())?;
            if supply.is_zero() {
                return Err(PairError::InsufficientLiquidityBurned);
            }

            let amount_a = Amount::new(mul_div(liquidity.get(), balance_a.get(), supply.get())?);
            let amount_b = Amount::new(mul_div(liquidity.get(), balance_b.get(), supply.get())?);
            if amount_a.is_zero() || amount_b.is_zero() {
                return Err(PairError::InsufficientLiquidityBurned);
            }

            safe_transfer(self.ledger_a.as_ref(), &pair, to, amount_a)?;
            safe_transfer(self.ledger_b.as_ref(), &pair, to, amount_b)?;

            let (balance_a, balance_b) = self.balances();
            let synced = state.synced(
                balance_a,
                balance_b,
                reserves.reserve_a,
                reserves.reserve_b,
                self.timestamp(),
            )?;
            let next = synced.with_k_last(fee.k_last_after(&synced.reserves()));

            if let Some((recipient, fee_shares)) = fee.mint {
                pending.push(self.issue_shares(&recipient, fee_shares)?);
            }
            let event = self.shares.lock().burn(&pair, liquidity)?;
            self.journal_shares([ShareUndo::Destroyed {
                from: pair,
                value: liquidity,
            }]);
            pending.push(event);
            self.commit_reserves(next, pending);
            pending.push(PairEvent::Burn {
                sender: *caller,
                amount_a,
                amount_b,
                to: *to,
            });

            debug!(pair = %pair, %to, %amount_a, %amount_b, %liquidity, "burned");
            Ok((amount_a, amount_b))
        })
    }

    /// Sends the requested outputs to `to`, optionally calls back, then
    /// checks that enough input arrived.
    ///
    /// When `data` is non-empty `callee.on_swap` runs after the outputs are
    /// sent and before the input check (a flash swap): it may use the
    /// outputs freely as long as the pair ends up paid.  Errors from the
    /// callee propagate unchanged, and everything the callee did on this
    /// thread (share moves, trades on other pairs) is undone with the swap.
    ///
    /// Emits `Sync`, `Swap`.
    ///
    /// # Errors
    ///
    /// - [`PairError::ReentrantCall`] if the pair is locked.
    /// - [`PairError::InsufficientOutputAmount`] if both outputs are zero.
    /// - [`PairError::InsufficientLiquidity`] if an output reaches its reserve.
    /// - [`PairError::InvalidRecipient`] if `to` is one of the assets.
    /// - [`PairError::CallbackFailed`] if `data` is non-empty and `callee`
    ///   is `None`.
    /// - [`PairError::InsufficientInputAmount`] if nothing was paid in.
    /// - [`PairError::KInvariantViolation`] if the input does not cover the
    ///   output plus fee.
    pub fn swap(
        &self,
        caller: &Address,
        amount_a_out: Amount,
        amount_b_out: Amount,
        to: &Address,
        data: &[u8],
        callee: Option<&dyn SwapCallee>,
    ) -> Result<(), PairError> {
        self.guarded("swap", |pending| {
            if amount_a_out.is_zero() && amount_b_out.is_zero() {
                return Err(PairError::InsufficientOutputAmount);
            }
            let state = *self.state.lock();
            let reserves = state.reserves();
            if amount_a_out >= reserves.reserve_a || amount_b_out >= reserves.reserve_b {
                return Err(PairError::InsufficientLiquidity);
            }
            if *to == self.token_a() || *to == self.token_b() {
                return Err(PairError::InvalidRecipient(*to));
            }

            let pair = self.address();
            if !amount_a_out.is_zero() {
                safe_transfer(self.ledger_a.as_ref(), &pair, to, amount_a_out)?;
            }
            if !amount_b_out.is_zero() {
                safe_transfer(self.ledger_b.as_ref(), &pair, to, amount_b_out)?;
            }

            if data.is_empty() {
                return self.settle_swap(&state, caller, amount_a_out, amount_b_out, to, pending);
            }
            let callee = callee.ok_or_else(|| PairError::CallbackFailed("no callback target".into()))?;
            callee.on_swap(self, caller, amount_a_out, amount_b_out, data)?;
            self.settle_swap(&state, caller, amount_a_out, amount_b_out, to, pending)
        })
    }

    /// Transfers any balance above the recorded reserves to `to`.
    ///
    /// # Errors
    ///
    /// - [`PairError::ReentrantCall`] if the pair is locked.
    /// - [`PairError::Underflow`] if a balance fell below its reserve.
    /// - [`PairError::TransferFailed`] if a ledger refuses the transfer.
    pub fn skim(&self, to: &Address) -> Result<(Amount, Amount), PairError> {
        self.guarded("skim", |_| {
            let pair = self.address();
            let reserves = self.state.lock().reserves();
            let (balance_a, balance_b) = self.balances();
            let excess_a = balance_a.safe_sub(&reserves.reserve_a)?;
            let excess_b = balance_b.safe_sub(&reserves.reserve_b)?;
            if !excess_a.is_zero() {
                safe_transfer(self.ledger_a.as_ref(), &pair, to, excess_a)?;
            }
            if !excess_b.is_zero() {
                safe_transfer(self.ledger_b.as_ref(), &pair, to, excess_b)?;
            }
            debug!(pair = %pair, %to, %excess_a, %excess_b, "skimmed");
            Ok((excess_a, excess_b))
        })
    }

    /// Records the actual balances as the new reserves.
    ///
    /// Emits `Sync`.
    ///
    /// # Errors
    ///
    /// - [`PairError::ReentrantCall`] if the pair is locked.
    /// - [`PairError::ReserveOverflow`] if a balance exceeds 112 bits.
    pub fn sync(&self) -> Result<(), PairError> {
        self.guarded("sync", |pending| {
            let state = *self.state.lock();
            let reserves = state.reserves();
            let (balance_a, balance_b) = self.balances();
            let next = state.synced(
                balance_a,
                balance_b,
                reserves.reserve_a,
                reserves.reserve_b,
                self.timestamp(),
            )?;
            self.commit_reserves(next, pending);
            debug!(pair = %self.address(), %balance_a, %balance_b, "synced");
            Ok(())
        })
    }

    // -- internals -------------------------------------------------------

    /// Runs `op` under the reentrancy guard inside a journal transaction,
    /// with both ledgers checkpointed.
    fn guarded<T>(
        &self,
        name: &'static str,
        op: impl FnOnce(&mut Vec<PairEvent>) -> Result<T, PairError>,
    ) -> Result<T, PairError> {
        let _lock = self.guard.enter().inspect_err(|_| {
            warn!(pair = %self.address(), op = name, "reentrant call rejected");
        })?;

        let tx = Transaction::begin();
        self.ledger_a.checkpoint();
        self.ledger_b.checkpoint();
        let mut pending = Vec::new();
        match op(&mut pending) {
            Ok(value) => {
                self.ledger_a.commit();
                self.ledger_b.commit();
                self.publish(pending);
                tx.commit();
                Ok(value)
            }
            Err(error) => {
                self.ledger_a.revert();
                self.ledger_b.revert();
                tx.revert();
                warn!(pair = %self.address(), op = name, %error, "operation rolled back");
                Err(error)
            }
        }
    }

    fn issue_shares(&self, to: &Address, value: Liquidity) -> Result<PairEvent, PairError> {
        let event = self.shares.lock().mint(to, value)?;
        self.journal_shares([ShareUndo::Issued { to: *to, value }]);
        Ok(event)
    }

    /// Works out the protocol-fee shares owed for growth since `k_last`.
    ///
    /// Pure: the caller mints the shares when it commits.  With the fee
    /// off a non-zero `k_last` is cleared through
    /// [`FeeAccrual::k_last_after`].
    fn accrue_protocol_fee(
        &self,
        state: &ReserveState,
        total_supply: Liquidity,
    ) -> Result<FeeAccrual, PairError> {
        let Some(recipient) = self.fee_source.fee_to() else {
            return Ok(FeeAccrual {
                fee_on: false,
                mint: None,
            });
        };
        let shares = protocol_fee_shares(state.k_last(), &state.reserves(), total_supply)?;
        Ok(FeeAccrual {
            fee_on: true,
            mint: (!shares.is_zero()).then_some((recipient, shares)),
        })
    }

    /// Input inference, the fee-adjusted product check and the final sync.
    fn settle_swap(
        &self,
        state: &ReserveState,
        caller: &Address,
        amount_a_out: Amount,
        amount_b_out: Amount,
        to: &Address,
        pending: &mut Vec<PairEvent>,
    ) -> Result<(), PairError> {
        let reserves = state.reserves();
        let (balance_a, balance_b) = self.balances();
        let amount_a_in = balance_a.saturating_sub(&reserves.reserve_a.saturating_sub(&amount_a_out));
        let amount_b_in = balance_b.saturating_sub(&reserves.reserve_b.saturating_sub(&amount_b_out));
        if amount_a_in.is_zero() && amount_b_in.is_zero() {
            return Err(PairError::InsufficientInputAmount);
        }

        let adjusted_a = fee_adjusted(balance_a, amount_a_in);
        let adjusted_b = fee_adjusted(balance_b, amount_b_in);
        let lhs = adjusted_a
            .checked_mul(adjusted_b)
            .ok_or(PairError::ReserveOverflow)?;
        let rhs = reserves.product() * U256::from(1_000_000u32);
        if lhs < rhs {
            warn!(pair = %self.address(), %amount_a_in, %amount_b_in, "fee-adjusted product decreased");
            return Err(PairError::KInvariantViolation);
        }

        let next = state.synced(
            balance_a,
            balance_b,
            reserves.reserve_a,
            reserves.reserve_b,
            self.timestamp(),
        )?;
        self.commit_reserves(next, pending);
        pending.push(PairEvent::Swap {
            sender: *caller,
            amount_a_in,
            amount_b_in,
            amount_a_out,
            amount_b_out,
            to: *to,
        });

        debug!(
            pair = %self.address(),
            %amount_a_in,
            %amount_b_in,
            %amount_a_out,
            %amount_b_out,
            "swapped"
        );
        Ok(())
    }

    fn commit_reserves(&self, next: ReserveState, pending: &mut Vec<PairEvent>) {
        let reserves = next.reserves();
        let prior = core::mem::replace(&mut *self.state.lock(), next);
        let state = Arc::clone(&self.state);
        journal::record(move || *state.lock() = prior);
        pending.push(PairEvent::Sync {
            reserve_a: reserves.reserve_a,
            reserve_b: reserves.reserve_b,
        });
    }
}

/// `balance·1000 − input·3`; never negative since `input ≤ balance`.
fn fee_adjusted(balance: Amount, input: Amount) -> U256 {
    widen(balance.get()) * U256::from(1_000u16)
        - widen(input.get()) * U256::from(SWAP_FEE_PER_MILLE)
}

/// Shares minted to the protocol for reserve growth since `k_last`.
fn protocol_fee_shares(
    k_last: U256,
    reserves: &Reserves,
    total_supply: Liquidity,
) -> Result<Liquidity, PairError> {
    if k_last.is_zero() {
        return Ok(Liquidity::ZERO);
    }
    let root_k = isqrt(reserves.product());
    let root_k_last = isqrt(k_last);
    if root_k <= root_k_last {
        return Ok(Liquidity::ZERO);
    }
    let numerator = widen(total_supply.get()) * widen(root_k - root_k_last);
    let denominator = widen(root_k) * U256::from(5u8) + widen(root_k_last);
    narrow(numerator / denominator)
        .map(Liquidity::new)
        .ok_or(PairError::Overflow("protocol fee shares exceed u128"))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn reserves(a: u128, b: u128) -> Reserves {
        Reserves {
            reserve_a: Amount::new(a),
            reserve_b: Amount::new(b),
            block_timestamp_last: 0,
        }
    }

    #[test]
    fn no_fee_without_k_last() {
        let Ok(shares) = protocol_fee_shares(U256::zero(), &reserves(4_000, 4_000), Liquidity::new(4_000)) else {
            panic!("expected Ok");
        };
        assert!(shares.is_zero());
    }

    #[test]
    fn no_fee_without_growth() {
        let k_last = U256::from(16_000_000u32);
        let Ok(shares) = protocol_fee_shares(k_last, &reserves(4_000, 4_000), Liquidity::new(4_000)) else {
            panic!("expected Ok");
        };
        assert!(shares.is_zero());
    }

    #[test]
    fn fee_is_one_sixth_of_growth() {
        // √k grows 1000 → 1200; supply 1000.
        // 1000 × 200 / (1200×5 + 1000) = 200000 / 7000 = 28
        let k_last = U256::from(1_000_000u32);
        let Ok(shares) = protocol_fee_shares(k_last, &reserves(1_200, 1_200), Liquidity::new(1_000)) else {
            panic!("expected Ok");
        };
        assert_eq!(shares, Liquidity::new(28));
    }

    #[test]
    fn fee_adjustment_charges_input_only() {
        assert_eq!(
            fee_adjusted(Amount::new(100), Amount::ZERO),
            U256::from(100_000u32)
        );
        assert_eq!(
            fee_adjusted(Amount::new(100), Amount::new(100)),
            U256::from(99_700u32)
        );
    }

    #[test]
    fn accrual_k_last_follows_switch() {
        let on = FeeAccrual {
            fee_on: true,
            mint: None,
        };
        let off = FeeAccrual {
            fee_on: false,
            mint: None,
        };
        let r = reserves(10, 20);
        assert_eq!(on.k_last_after(&r), U256::from(200u8));
        assert!(off.k_last_after(&r).is_zero());
        assert!(on.shares().is_zero());
    }
}
