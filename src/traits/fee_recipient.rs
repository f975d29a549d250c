//! Protocol-fee switch exposed by the pair registry.

use crate::domain::Address;

/// Source of the current protocol-fee recipient.
///
/// The registry that created the pair owns this switch.  The fee is
/// enabled exactly when a recipient is returned.
pub trait FeeRecipientSource: Send + Sync {
    /// Current protocol-fee recipient, or `None` when the fee is off.
    fn fee_to(&self) -> Option<Address>;
}
