//! Outbound asset movement tolerant of non-conforming ledgers.

use tracing::warn;

use crate::domain::{Address, Amount};
use crate::error::PairError;
use crate::traits::AssetLedger;

/// Moves `amount` of the ledger's asset from `from` to `to`.
///
/// Both [`TransferReceipt::Success`](crate::traits::TransferReceipt::Success)
/// and the silent "no return value" outcome count as success.
///
/// # Errors
///
/// Returns [`PairError::TransferFailed`] when the ledger reports failure.
pub fn safe_transfer(
    ledger: &dyn AssetLedger,
    from: &Address,
    to: &Address,
    amount: Amount,
) -> Result<(), PairError> {
    let receipt = ledger.transfer(from, to, amount);
    if receipt.is_accepted() {
        return Ok(());
    }
    let asset = ledger.asset();
    warn!(%asset, %to, %amount, "asset ledger rejected transfer");
    Err(PairError::TransferFailed { asset })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::host::{MemoryLedger, TransferStyle};

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 32])
    }

    fn funded(style: TransferStyle) -> MemoryLedger {
        let ledger = MemoryLedger::with_style(addr(0xAA), style);
        let Ok(()) = ledger.mint_to(&addr(1), Amount::new(100)) else {
            panic!("funding failed");
        };
        ledger
    }

    #[test]
    fn explicit_success_accepted() {
        let ledger = funded(TransferStyle::Standard);
        assert_eq!(safe_transfer(&ledger, &addr(1), &addr(2), Amount::new(10)), Ok(()));
        assert_eq!(ledger.balance_of(&addr(2)), Amount::new(10));
    }

    #[test]
    fn silent_success_accepted() {
        let ledger = funded(TransferStyle::NoReturn);
        assert_eq!(safe_transfer(&ledger, &addr(1), &addr(2), Amount::new(10)), Ok(()));
        assert_eq!(ledger.balance_of(&addr(2)), Amount::new(10));
    }

    #[test]
    fn explicit_failure_rejected() {
        let ledger = funded(TransferStyle::Rejecting);
        assert_eq!(
            safe_transfer(&ledger, &addr(1), &addr(2), Amount::new(10)),
            Err(PairError::TransferFailed { asset: addr(0xAA) })
        );
        assert_eq!(ledger.balance_of(&addr(1)), Amount::new(100));
    }

    #[test]
    fn insufficient_funds_rejected() {
        let ledger = funded(TransferStyle::NoReturn);
        assert!(matches!(
            safe_transfer(&ledger, &addr(1), &addr(2), Amount::new(101)),
            Err(PairError::TransferFailed { .. })
        ));
    }
}
