//! Constant-product pair walkthrough (Uniswap V2 style).
//!
//! Seeds a pair, trades against it, runs a flash swap that repays inside
//! the callback, reads the time-weighted price and withdraws.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=pair_amm=debug cargo run --example flash_swap
//! ```

use std::sync::Arc;

use pair_amm::prelude::*;
use tracing_subscriber::EnvFilter;

/// Borrows WETH and pays it back in WETH plus the 0.3% fee.
struct Arbitrageur {
    me: Address,
    weth: Arc<MemoryLedger>,
}

impl SwapCallee for Arbitrageur {
    fn on_swap(
        &self,
        pair: &Pair,
        _initiator: &Address,
        _usdc_out: Amount,
        weth_out: Amount,
        _data: &[u8],
    ) -> Result<()> {
        // repay ceil(out × 1000 / 997)
        let owed = Amount::new(weth_out.get() * 1_000 / 997 + 1);
        println!("  Callback:    holding {weth_out} WETH, repaying {owed}");
        if self.weth.transfer(&self.me, &pair.address(), owed).is_accepted() {
            Ok(())
        } else {
            Err(PairError::CallbackFailed("repayment refused".into()))
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Constant Product Pair (x · y = k) ===\n");

    // ── 1. Assets, ledgers and the pair ─────────────────────────────────
    let usdc = Address::from_bytes([1u8; 32]);
    let weth = Address::from_bytes([2u8; 32]);
    let config = PairConfig::new(Address::from_bytes([0xFA; 32]), usdc, weth)?;
    println!("Pair address: {}", config.address());

    let usdc_ledger = Arc::new(MemoryLedger::new(usdc));
    let weth_ledger = Arc::new(MemoryLedger::new(weth));
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let fees = Arc::new(FeeSwitch::enabled(Address::from_bytes([0x7E; 32])));
    let pair = Pair::new(
        config,
        usdc_ledger.clone(),
        weth_ledger.clone(),
        fees,
        clock.clone(),
    )?;

    // ── 2. Seed liquidity ───────────────────────────────────────────────
    let lp = Address::from_bytes([3u8; 32]);
    usdc_ledger.mint_to(&lp, Amount::new(2_000_000))?;
    weth_ledger.mint_to(&lp, Amount::new(1_000_000))?;
    usdc_ledger.transfer(&lp, &pair.address(), Amount::new(2_000_000));
    weth_ledger.transfer(&lp, &pair.address(), Amount::new(1_000_000));
    let shares = pair.mint(&lp, &lp)?;

    println!("\n--- Seed ---");
    println!("  LP shares:   {shares}");
    println!("  Locked:      {MINIMUM_LIQUIDITY}");
    let start = PriceObservation::observe(&pair);

    // ── 3. Sell 10 000 USDC ─────────────────────────────────────────────
    clock.advance(60);
    let trader = Address::from_bytes([4u8; 32]);
    usdc_ledger.mint_to(&trader, Amount::new(10_000))?;
    usdc_ledger.transfer(&trader, &pair.address(), Amount::new(10_000));
    let reserves = pair.reserves();
    let out = get_amount_out(Amount::new(10_000), reserves.reserve_a, reserves.reserve_b)?;
    pair.swap(&trader, Amount::ZERO, out, &trader, &[], None)?;

    println!("\n--- Swap: sell 10 000 USDC ---");
    println!("  WETH out:    {out}");
    let reserves = pair.reserves();
    println!("  Reserves:    {} / {}", reserves.reserve_a, reserves.reserve_b);

    // ── 4. Flash swap ───────────────────────────────────────────────────
    clock.advance(60);
    let arb = Address::from_bytes([5u8; 32]);
    weth_ledger.mint_to(&arb, Amount::new(100))?;
    let callee = Arbitrageur {
        me: arb,
        weth: weth_ledger.clone(),
    };
    println!("\n--- Flash swap: borrow 20 000 WETH ---");
    pair.swap(
        &arb,
        Amount::ZERO,
        Amount::new(20_000),
        &arb,
        b"flash",
        Some(&callee),
    )?;
    println!("  Arb WETH:    {}", weth_ledger.balance_of(&arb));

    // ── 5. Time-weighted price ──────────────────────────────────────────
    clock.advance(60);
    let end = PriceObservation::observe(&pair);
    let (usdc_price, weth_price) = average_prices(&start, &end)?;
    println!("\n--- Oracle over 180 s ---");
    println!("  USDC in WETH: {usdc_price}");
    println!("  WETH in USDC: {weth_price}");

    // ── 6. Withdraw ─────────────────────────────────────────────────────
    pair.transfer(&lp, &pair.address(), shares)?;
    let (usdc_back, weth_back) = pair.burn(&lp, &lp)?;
    println!("\n--- Withdraw ---");
    println!("  Returned:    {usdc_back} USDC + {weth_back} WETH");
    println!(
        "  Protocol:    {} shares",
        pair.balance_of(&Address::from_bytes([0x7E; 32]))
    );

    println!("\n--- Events ---");
    for event in pair.take_events() {
        println!("  {}", event.name());
    }

    Ok(())
}
