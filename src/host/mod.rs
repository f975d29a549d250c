//! In-process implementations of the pair's collaborator traits.
//!
//! Used by the tests, the demo binary and any embedding that keeps asset
//! balances in memory.
//!
//! - [`MemoryLedger`] — journaled [`AssetLedger`](crate::traits::AssetLedger)
//!   with configurable transfer signalling.
//! - [`ManualClock`] / [`SystemClock`] — [`Clock`](crate::traits::Clock)s.
//! - [`FeeSwitch`] — mutable protocol-fee recipient.

mod clock;
mod fee_switch;
mod ledger;

pub use clock::{ManualClock, SystemClock};
pub use fee_switch::FeeSwitch;
pub use ledger::{MemoryLedger, TransferStyle};
