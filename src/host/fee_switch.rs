//! Mutable protocol-fee recipient.

use parking_lot::RwLock;

use crate::domain::Address;
use crate::traits::FeeRecipientSource;

/// Registry-side switch turning the protocol fee on and off.
///
/// Shared between the registry and every pair it created; the pairs read
/// it at the start of each mint and burn.
#[derive(Debug, Default)]
pub struct FeeSwitch {
    fee_to: RwLock<Option<Address>>,
}

impl FeeSwitch {
    /// Creates a switch with the fee off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fee_to: RwLock::new(None),
        }
    }

    /// Creates a switch with the fee paid to `recipient`.
    #[must_use]
    pub fn enabled(recipient: Address) -> Self {
        Self {
            fee_to: RwLock::new(Some(recipient)),
        }
    }

    /// Replaces the recipient; `None` turns the fee off.
    pub fn set_fee_to(&self, recipient: Option<Address>) {
        *self.fee_to.write() = recipient;
    }
}

impl FeeRecipientSource for FeeSwitch {
    fn fee_to(&self) -> Option<Address> {
        *self.fee_to.read()
    }
}
