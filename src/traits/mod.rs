//! Collaborator traits at the pair's external boundary.
//!
//! - [`AssetLedger`] — the two external asset ledgers.
//! - [`SwapCallee`] — the caller-supplied flash-swap callback target.
//! - [`FeeRecipientSource`] — the registry's protocol-fee switch.
//! - [`Clock`] — wall-clock seconds for the price oracle and permits.

mod asset_ledger;
mod clock;
mod fee_recipient;
mod swap_callee;

pub use asset_ledger::{AssetLedger, TransferReceipt};
pub use clock::Clock;
pub use fee_recipient::FeeRecipientSource;
pub use swap_callee::SwapCallee;
