//! The constant-product pair.
//!
//! A [`Pair`] holds two external assets, issues shares against them and
//! lets anyone trade one for the other as long as the fee-adjusted reserve
//! product never decreases.  It is deliberately minimal: callers move
//! assets into the pair *before* calling [`Pair::mint`] or [`Pair::swap`],
//! and the pair infers what it received by comparing actual balances with
//! its recorded reserves.
//!
//! # Atomicity
//!
//! Guarded operations (`mint`, `burn`, `swap`, `skim`, `sync`) either
//! complete or leave no trace:
//!
//! - internal state is computed first and written only after every check;
//! - both asset ledgers are checkpointed on entry and reverted on failure;
//! - events are buffered and appended to the log on success only;
//! - every write to reserves, shares or the event log made while a guarded
//!   operation runs on this thread is journaled, so a flash swap that fails
//!   also undoes what its callee did to this or any other pair.
//!
//! # Thread safety
//!
//! `Pair` is `Send + Sync`.  Its mutable parts sit behind short-lived
//! mutexes that are never held across a call into a ledger or a callback,
//! and the reentrancy guard rejects instead of blocking.

mod engine;
mod guard;
mod journal;
mod permit;
mod reserves;
mod shares;
mod transfer;

#[cfg(test)]
mod proptest_properties;

use core::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::PairConfig;
use crate::domain::{Address, Amount, Liquidity, TokenPair};
use crate::error::PairError;
use crate::events::{EventLog, PairEvent};
use crate::math::U256;
use crate::traits::{AssetLedger, Clock, FeeRecipientSource};

pub use guard::{LockGuard, ReentrancyGuard};
pub use permit::{domain_separator, permit_digest, permit_typehash, DOMAIN_VERSION};
pub use reserves::{truncate_timestamp, ReserveState, Reserves};
pub use shares::ShareLedger;
pub use transfer::safe_transfer;

use shares::ShareUndo;

/// Shares locked forever at the zero address by the first deposit.
pub const MINIMUM_LIQUIDITY: Liquidity = Liquidity::new(1_000);

/// A two-asset constant-product pool.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use pair_amm::config::PairConfig;
/// use pair_amm::domain::{Address, Amount, Liquidity};
/// use pair_amm::host::{FeeSwitch, ManualClock, MemoryLedger};
/// use pair_amm::pair::Pair;
/// use pair_amm::traits::AssetLedger;
///
/// let token_x = Address::from_bytes([1u8; 32]);
/// let token_y = Address::from_bytes([2u8; 32]);
/// let cfg = PairConfig::new(Address::from_bytes([9u8; 32]), token_x, token_y)
///     .expect("valid config");
///
/// let ledger_x = Arc::new(MemoryLedger::new(token_x));
/// let ledger_y = Arc::new(MemoryLedger::new(token_y));
/// let pair = Pair::new(
///     cfg,
///     ledger_x.clone(),
///     ledger_y.clone(),
///     Arc::new(FeeSwitch::new()),
///     Arc::new(ManualClock::new(1_000)),
/// )
/// .expect("ledgers match config");
///
/// // Deposit 2000 of each asset, then mint.
/// let lp = Address::from_bytes([3u8; 32]);
/// ledger_x.mint_to(&pair.address(), Amount::new(2_000)).expect("funded");
/// ledger_y.mint_to(&pair.address(), Amount::new(2_000)).expect("funded");
///
/// let shares = pair.mint(&lp, &lp).expect("first deposit");
/// assert_eq!(shares, Liquidity::new(1_000));
/// assert_eq!(pair.total_supply(), Liquidity::new(2_000));
/// ```
pub struct Pair {
    config: PairConfig,
    ledger_a: Arc<dyn AssetLedger>,
    ledger_b: Arc<dyn AssetLedger>,
    fee_source: Arc<dyn FeeRecipientSource>,
    clock: Arc<dyn Clock>,
    guard: ReentrancyGuard,
    state: Arc<Mutex<ReserveState>>,
    shares: Arc<Mutex<ShareLedger>>,
    events: Arc<Mutex<EventLog>>,
    domain_separator: [u8; 32],
}

impl Pair {
    /// Shares locked forever at the zero address by the first deposit.
    pub const MINIMUM_LIQUIDITY: Liquidity = MINIMUM_LIQUIDITY;

    /// Creates an empty pair.
    ///
    /// The two ledgers may be passed in either order; they are matched to
    /// the configured assets by [`AssetLedger::asset`].
    ///
    /// # Errors
    ///
    /// - [`PairError::InvalidConfiguration`] if `config` fails validation.
    /// - [`PairError::InvalidToken`] if the ledgers do not serve exactly the
    ///   two configured assets.
    pub fn new(
        config: PairConfig,
        ledger_x: Arc<dyn AssetLedger>,
        ledger_y: Arc<dyn AssetLedger>,
        fee_source: Arc<dyn FeeRecipientSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PairError> {
        config.validate()?;
        let tokens = *config.token_pair();
        let (ledger_a, ledger_b) = if ledger_x.asset() == tokens.token_a()
            && ledger_y.asset() == tokens.token_b()
        {
            (ledger_x, ledger_y)
        } else if ledger_y.asset() == tokens.token_a() && ledger_x.asset() == tokens.token_b() {
            (ledger_y, ledger_x)
        } else {
            return Err(PairError::InvalidToken(
                "asset ledgers do not match the configured token pair",
            ));
        };

        let domain_separator = domain_separator(&config);
        debug!(pair = %config.address(), token_a = %tokens.token_a(), token_b = %tokens.token_b(), "pair created");

        Ok(Self {
            config,
            ledger_a,
            ledger_b,
            fee_source,
            clock,
            guard: ReentrancyGuard::new(),
            state: Arc::new(Mutex::new(ReserveState::default())),
            shares: Arc::new(Mutex::new(ShareLedger::default())),
            events: Arc::new(Mutex::new(EventLog::default())),
            domain_separator,
        })
    }

    // -- identity -------------------------------------------------------

    /// Configuration the pair was created from.
    #[must_use]
    pub const fn config(&self) -> &PairConfig {
        &self.config
    }

    /// Address at which the pair holds assets and its own shares.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.config.address()
    }

    /// Canonically ordered asset pair.
    #[must_use]
    pub const fn token_pair(&self) -> &TokenPair {
        self.config.token_pair()
    }

    /// Lower-ordered asset.
    #[must_use]
    pub const fn token_a(&self) -> Address {
        self.config.token_pair().token_a()
    }

    /// Higher-ordered asset.
    #[must_use]
    pub const fn token_b(&self) -> Address {
        self.config.token_pair().token_b()
    }

    /// Share-token name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Share-token symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        self.config.symbol()
    }

    /// Share-token display decimals.
    #[must_use]
    pub const fn decimals(&self) -> u8 {
        self.config.decimals()
    }

    /// Domain separator of permit signatures for this pair.
    #[must_use]
    pub const fn domain_separator(&self) -> [u8; 32] {
        self.domain_separator
    }

    // -- reserve & oracle state ------------------------------------------

    /// Recorded reserves and the timestamp of the last sync.
    #[must_use]
    pub fn reserves(&self) -> Reserves {
        self.state.lock().reserves()
    }

    /// Full reserve, oracle and fee checkpoint state.
    #[must_use]
    pub fn reserve_state(&self) -> ReserveState {
        *self.state.lock()
    }

    /// Accumulated UQ112x112 price of A in B, times seconds.
    #[must_use]
    pub fn price_a_cumulative_last(&self) -> U256 {
        self.state.lock().price_a_cumulative_last()
    }

    /// Accumulated UQ112x112 price of B in A, times seconds.
    #[must_use]
    pub fn price_b_cumulative_last(&self) -> U256 {
        self.state.lock().price_b_cumulative_last()
    }

    /// Reserve product after the last liquidity event with the fee on.
    #[must_use]
    pub fn k_last(&self) -> U256 {
        self.state.lock().k_last()
    }

    /// Current clock reading, truncated to the oracle's 32-bit seconds.
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        truncate_timestamp(self.clock.now())
    }

    /// Actual balances of the pair on both asset ledgers.
    #[must_use]
    pub fn balances(&self) -> (Amount, Amount) {
        let pair = self.address();
        (
            self.ledger_a.balance_of(&pair),
            self.ledger_b.balance_of(&pair),
        )
    }

    /// Returns `true` while a guarded operation is running.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.guard.is_locked()
    }

    // -- shares ----------------------------------------------------------

    /// Total shares in existence.
    #[must_use]
    pub fn total_supply(&self) -> Liquidity {
        self.shares.lock().total_supply()
    }

    /// Shares held by `holder`.
    #[must_use]
    pub fn balance_of(&self, holder: &Address) -> Liquidity {
        self.shares.lock().balance_of(holder)
    }

    /// Remaining quota `spender` may move on behalf of `owner`.
    #[must_use]
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Liquidity {
        self.shares.lock().allowance(owner, spender)
    }

    /// Next permit nonce of `owner`.
    #[must_use]
    pub fn nonces(&self, owner: &Address) -> u64 {
        self.shares.lock().nonce(owner)
    }

    /// Moves `value` of `from`'s shares to `to`.
    ///
    /// Emits `Transfer`.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::InsufficientBalance`] if `from` holds too few.
    pub fn transfer(&self, from: &Address, to: &Address, value: Liquidity) -> Result<(), PairError> {
        let event = self.shares.lock().transfer(from, to, value)?;
        self.journal_shares([ShareUndo::Moved {
            from: *from,
            to: *to,
            value,
        }]);
        self.publish([event]);
        Ok(())
    }

    /// Sets the allowance of `spender` over `owner`'s shares.
    ///
    /// Emits `Approval`.
    pub fn approve(&self, owner: &Address, spender: &Address, value: Liquidity) {
        let (previous, event) = {
            let mut shares = self.shares.lock();
            (shares.allowance(owner, spender), shares.approve(owner, spender, value))
        };
        self.journal_shares([ShareUndo::Allowance {
            owner: *owner,
            spender: *spender,
            previous,
        }]);
        self.publish([event]);
    }

    /// Moves `value` of `from`'s shares to `to` using `spender`'s allowance.
    ///
    /// Emits `Transfer`.
    ///
    /// # Errors
    ///
    /// - [`PairError::InsufficientAllowance`] if the allowance is too small.
    /// - [`PairError::InsufficientBalance`] if `from` holds too few shares.
    pub fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        value: Liquidity,
    ) -> Result<(), PairError> {
        let (previous, event) = {
            let mut shares = self.shares.lock();
            let previous = shares.allowance(from, spender);
            (previous, shares.transfer_from(spender, from, to, value)?)
        };
        self.journal_shares([
            ShareUndo::Moved {
                from: *from,
                to: *to,
                value,
            },
            ShareUndo::Allowance {
                owner: *from,
                spender: *spender,
                previous,
            },
        ]);
        self.publish([event]);
        Ok(())
    }

    /// Sets an allowance from a signature by `owner`.
    ///
    /// The signature covers [`permit_digest`] for the owner's current nonce,
    /// which is consumed on success.  Emits `Approval`.
    ///
    /// # Errors
    ///
    /// - [`PairError::SignatureExpired`] if `deadline` is in the past.
    /// - [`PairError::InvalidSignature`] if the signature does not verify.
    pub fn permit(
        &self,
        owner: &Address,
        spender: &Address,
        value: Liquidity,
        deadline: u64,
        signature: &[u8; 64],
    ) -> Result<(), PairError> {
        if deadline < self.clock.now() {
            return Err(PairError::SignatureExpired);
        }
        let (nonce, previous, event) = {
            let mut shares = self.shares.lock();
            let nonce = shares.nonce(owner);
            let digest = permit_digest(&self.domain_separator, owner, spender, value, nonce, deadline);
            permit::verify(owner, &digest, signature)?;
            let previous = shares.allowance(owner, spender);
            shares.use_nonce(owner);
            (nonce, previous, shares.approve(owner, spender, value))
        };
        self.journal_shares([
            ShareUndo::Nonce {
                owner: *owner,
                previous: nonce,
            },
            ShareUndo::Allowance {
                owner: *owner,
                spender: *spender,
                previous,
            },
        ]);
        self.publish([event]);
        Ok(())
    }

    // -- events ----------------------------------------------------------

    /// Drains and returns every committed event, oldest first.
    pub fn take_events(&self) -> Vec<PairEvent> {
        self.events.lock().drain()
    }

    // -- journaling ------------------------------------------------------

    /// Journals the reversal of share changes applied in the given order.
    fn journal_shares(&self, entries: impl IntoIterator<Item = ShareUndo>) {
        if !journal::is_open() {
            return;
        }
        let entries: Vec<ShareUndo> = entries.into_iter().collect();
        let shares = Arc::clone(&self.shares);
        journal::record(move || {
            let mut shares = shares.lock();
            for entry in entries.into_iter().rev() {
                shares.undo(entry);
            }
        });
    }

    /// Appends `events` to the log; a rollback removes exactly these.
    fn publish(&self, events: impl IntoIterator<Item = PairEvent>) {
        let seqs = self.events.lock().append(events);
        if journal::is_open() {
            let log = Arc::clone(&self.events);
            journal::record(move || log.lock().remove(&seqs));
        }
    }
}

impl fmt::Debug for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pair")
            .field("address", &self.address())
            .field("token_pair", self.token_pair())
            .field("state", &*self.state.lock())
            .field("total_supply", &self.total_supply())
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}
