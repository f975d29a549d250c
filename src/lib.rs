//! # Pair AMM
//!
//! Two-asset constant-product pair engine: liquidity shares, optimistic and
//! flash swaps, a manipulation-resistant price oracle and an optional
//! protocol fee.
//!
//! A [`Pair`](pair::Pair) never pulls funds.  Callers move assets into the
//! pair on the external [`AssetLedger`](traits::AssetLedger)s first, then
//! ask it to account for what arrived:
//!
//! - **mint** — deposits since the last sync become shares;
//! - **burn** — shares sent to the pair are redeemed pro rata;
//! - **swap** — outputs are sent optimistically, an optional callback runs,
//!   and the fee-adjusted product `(x·1000 − 3·in_x)(y·1000 − 3·in_y)` must
//!   not fall below `x₀·y₀·1000²`;
//! - **skim** / **sync** — reconcile balances and reserves.
//!
//! Every one of these runs under a reentrancy guard and is atomic: on any
//! error both ledgers, the share ledger and the event log are left as they
//! were.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pair_amm::prelude::*;
//!
//! let usdc = Address::from_bytes([1u8; 32]);
//! let weth = Address::from_bytes([2u8; 32]);
//! let config = PairConfig::new(Address::from_bytes([0xFA; 32]), usdc, weth)
//!     .expect("valid config");
//!
//! let usdc_ledger = Arc::new(MemoryLedger::new(usdc));
//! let weth_ledger = Arc::new(MemoryLedger::new(weth));
//! let pair = Pair::new(
//!     config,
//!     usdc_ledger.clone(),
//!     weth_ledger.clone(),
//!     Arc::new(FeeSwitch::new()),
//!     Arc::new(ManualClock::new(1_700_000_000)),
//! )
//! .expect("ledgers match the pair");
//!
//! // 1. Seed liquidity
//! let lp = Address::from_bytes([3u8; 32]);
//! usdc_ledger.mint_to(&pair.address(), Amount::new(1_000_000)).expect("funded");
//! weth_ledger.mint_to(&pair.address(), Amount::new(1_000_000)).expect("funded");
//! pair.mint(&lp, &lp).expect("seeded");
//!
//! // 2. Sell 10 000 USDC for WETH
//! let trader = Address::from_bytes([4u8; 32]);
//! usdc_ledger.mint_to(&pair.address(), Amount::new(10_000)).expect("paid in");
//! let reserves = pair.reserves();
//! let out = get_amount_out(Amount::new(10_000), reserves.reserve_a, reserves.reserve_b)
//!     .expect("priced");
//! pair.swap(&trader, Amount::ZERO, out, &trader, &[], None).expect("swapped");
//!
//! assert_eq!(weth_ledger.balance_of(&trader), out);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    Caller     │  transfers assets in, then calls mint / burn / swap
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐   ReentrancyGuard → checkpoint ledgers → compute
//! │     Pair      │   → validate → commit (or revert everything)
//! └──┬───┬───┬───┘
//!    │   │   └──── FeeRecipientSource (registry fee switch), Clock
//!    │   └──────── SwapCallee (flash-swap callback)
//!    ▼
//! ┌──────────────┐
//! │ AssetLedger ×2│  balance_of, transfer, checkpoint / commit / revert
//! └──────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`Address`](domain::Address), [`Amount`](domain::Amount), [`Liquidity`](domain::Liquidity), [`TokenPair`](domain::TokenPair) |
//! | [`pair`] | The [`Pair`](pair::Pair) engine, share ledger, reserves, guard and permit |
//! | [`traits`] | Collaborator seams: ledgers, callback, fee switch, clock |
//! | [`host`] | In-memory collaborators: [`MemoryLedger`](host::MemoryLedger), clocks, [`FeeSwitch`](host::FeeSwitch) |
//! | [`library`] | Quote and exact-in / exact-out pricing |
//! | [`oracle`] | Time-weighted average prices |
//! | [`config`] | [`PairConfig`](config::PairConfig), TOML loading |
//! | [`events`] | [`PairEvent`](events::PairEvent) log entries |
//! | [`math`] | 256-bit intermediates, integer square root, UQ112x112 |
//! | [`error`] | [`PairError`](error::PairError) unified error enum |
//! | [`prelude`] | Convenience re-exports |

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod host;
pub mod library;
pub mod math;
pub mod oracle;
pub mod pair;
pub mod prelude;
pub mod traits;
