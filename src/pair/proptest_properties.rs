//! Property-based tests for the pair's accounting invariants.
//!
//! 1. **Product monotonicity** — a priced swap never lowers `reserve_a × reserve_b`.
//! 2. **Round-trip loss** — selling the output of a swap back yields at most the input.
//! 3. **Deposit/withdraw** — an immediate proportional exit loses at most one unit.
//! 4. **Share conservation** — balances always sum to the total supply.
//! 5. **Reconciliation** — after `skim` then `sync`, reserves equal balances.

use std::sync::Arc;

use proptest::prelude::*;

use crate::config::PairConfig;
use crate::domain::{Address, Amount, Liquidity};
use crate::host::{FeeSwitch, ManualClock, MemoryLedger};
use crate::library::get_amount_out;
use crate::pair::Pair;
use crate::traits::AssetLedger;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const TOKEN_A: Address = Address::from_bytes([1u8; 32]);
const TOKEN_B: Address = Address::from_bytes([2u8; 32]);
const ALICE: Address = Address::from_bytes([0xA1; 32]);
const BOB: Address = Address::from_bytes([0xB0; 32]);

struct Harness {
    pair: Pair,
    ledger_a: Arc<MemoryLedger>,
    ledger_b: Arc<MemoryLedger>,
}

impl Harness {
    fn new() -> Self {
        let Ok(cfg) = PairConfig::new(Address::from_bytes([9u8; 32]), TOKEN_A, TOKEN_B) else {
            panic!("valid config");
        };
        let ledger_a = Arc::new(MemoryLedger::new(TOKEN_A));
        let ledger_b = Arc::new(MemoryLedger::new(TOKEN_B));
        let Ok(pair) = Pair::new(
            cfg,
            ledger_a.clone(),
            ledger_b.clone(),
            Arc::new(FeeSwitch::new()),
            Arc::new(ManualClock::new(1_000)),
        ) else {
            panic!("valid pair");
        };
        Self {
            pair,
            ledger_a,
            ledger_b,
        }
    }

    fn seeded(ra: u128, rb: u128) -> Self {
        let h = Self::new();
        h.deposit(&ALICE, ra, rb);
        h
    }

    fn pay_in(&self, a: u128, b: u128) {
        let to = self.pair.address();
        let Ok(()) = self.ledger_a.mint_to(&to, Amount::new(a)) else {
            panic!("fund a");
        };
        let Ok(()) = self.ledger_b.mint_to(&to, Amount::new(b)) else {
            panic!("fund b");
        };
    }

    fn deposit(&self, lp: &Address, a: u128, b: u128) -> Liquidity {
        self.pay_in(a, b);
        let Ok(shares) = self.pair.mint(lp, lp) else {
            panic!("mint failed");
        };
        shares
    }

    fn withdraw(&self, lp: &Address, shares: Liquidity) -> (Amount, Amount) {
        let Ok(()) = self.pair.transfer(lp, &self.pair.address(), shares) else {
            panic!("share transfer failed");
        };
        let Ok(out) = self.pair.burn(lp, lp) else {
            panic!("burn failed");
        };
        out
    }

    /// Pays `amount_in` of A and takes the priced amount of B.
    fn sell_a(&self, trader: &Address, amount_in: u128) -> Amount {
        let r = self.pair.reserves();
        let Ok(out) = get_amount_out(Amount::new(amount_in), r.reserve_a, r.reserve_b) else {
            panic!("priced");
        };
        self.pay_in(amount_in, 0);
        let Ok(()) = self.pair.swap(trader, Amount::ZERO, out, trader, &[], None) else {
            panic!("swap failed");
        };
        out
    }

    fn product(&self) -> u128 {
        let r = self.pair.reserves();
        r.reserve_a.get() * r.reserve_b.get()
    }
}

fn reserve() -> impl Strategy<Value = u128> {
    10_000u128..1_000_000_000
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn swap_never_lowers_product(ra in reserve(), rb in reserve(), pct in 1u128..50) {
        let h = Harness::seeded(ra, rb);
        let before = h.product();
        let amount_in = (ra * pct / 100).max(1);
        let r = h.pair.reserves();
        prop_assume!(get_amount_out(Amount::new(amount_in), r.reserve_a, r.reserve_b)
            .is_ok_and(|out| !out.is_zero()));
        h.sell_a(&BOB, amount_in);
        prop_assert!(h.product() > before);
    }

    #[test]
    fn round_trip_never_profits(ra in reserve(), rb in reserve(), pct in 1u128..50) {
        let h = Harness::seeded(ra, rb);
        let amount_in = (ra * pct / 100).max(1);
        let r = h.pair.reserves();
        prop_assume!(get_amount_out(Amount::new(amount_in), r.reserve_a, r.reserve_b)
            .is_ok_and(|out| !out.is_zero()));
        let got_b = h.sell_a(&BOB, amount_in);

        let r = h.pair.reserves();
        let Ok(back) = get_amount_out(got_b, r.reserve_b, r.reserve_a) else {
            return Err(TestCaseError::reject("output too small to sell back"));
        };
        prop_assert!(back.get() <= amount_in);
    }

    #[test]
    fn deposit_then_withdraw_loses_at_most_one(seed in reserve(), extra in 1_000u128..1_000_000) {
        let h = Harness::seeded(seed, seed);
        let shares = h.deposit(&BOB, extra, extra);
        let (a, b) = h.withdraw(&BOB, shares);
        prop_assert!(extra - a.get() <= 1);
        prop_assert!(extra - b.get() <= 1);
    }

    #[test]
    fn shares_sum_to_supply(
        ra in reserve(),
        rb in reserve(),
        pct in 1u128..100,
        move_pct in 0u128..100,
    ) {
        let h = Harness::seeded(ra, rb);
        let bob_shares = h.deposit(&BOB, ra * pct / 100 + 1, rb * pct / 100 + 1);
        let moved = Liquidity::new(bob_shares.get() * move_pct / 100);
        let Ok(()) = h.pair.transfer(&BOB, &ALICE, moved) else {
            return Err(TestCaseError::fail("transfer failed"));
        };
        let shares = h.pair.shares.lock().clone();
        prop_assert_eq!(shares.sum_of_balances(), shares.total_supply().get());

        let alice = h.pair.balance_of(&ALICE);
        h.withdraw(&ALICE, alice);
        let shares = h.pair.shares.lock().clone();
        prop_assert_eq!(shares.sum_of_balances(), shares.total_supply().get());
    }

    #[test]
    fn skim_then_sync_reconciles(
        ra in reserve(),
        rb in reserve(),
        donate_a in 0u128..1_000_000,
        donate_b in 0u128..1_000_000,
    ) {
        let h = Harness::seeded(ra, rb);
        h.pay_in(donate_a, donate_b);
        let Ok((skim_a, skim_b)) = h.pair.skim(&BOB) else {
            return Err(TestCaseError::fail("skim failed"));
        };
        prop_assert_eq!(skim_a.get(), donate_a);
        prop_assert_eq!(skim_b.get(), donate_b);
        let Ok(()) = h.pair.sync() else {
            return Err(TestCaseError::fail("sync failed"));
        };
        let r = h.pair.reserves();
        let (ba, bb) = h.pair.balances();
        prop_assert_eq!((r.reserve_a, r.reserve_b), (ba, bb));
        prop_assert_eq!(h.ledger_a.balance_of(&BOB).get(), donate_a);
    }
}
