//! Durable log of pair state changes.
//!
//! Every public mutating operation emits exactly the events listed on its
//! documentation.  Events from a guarded operation are buffered and only
//! appended to the pair's log when the operation commits; a failed
//! operation leaves no trace.

use std::collections::HashSet;

use crate::domain::{Address, Amount, Liquidity};

/// An externally observable pair event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairEvent {
    /// Liquidity deposited.
    Mint {
        /// Caller of `mint`.
        sender: Address,
        /// Deposited amount of asset A.
        amount_a: Amount,
        /// Deposited amount of asset B.
        amount_b: Amount,
    },
    /// Liquidity withdrawn.
    Burn {
        /// Caller of `burn`.
        sender: Address,
        /// Amount of asset A paid out.
        amount_a: Amount,
        /// Amount of asset B paid out.
        amount_b: Amount,
        /// Recipient of the payout.
        to: Address,
    },
    /// Trade executed.
    Swap {
        /// Caller of `swap`.
        sender: Address,
        /// Inferred input of asset A.
        amount_a_in: Amount,
        /// Inferred input of asset B.
        amount_b_in: Amount,
        /// Output of asset A.
        amount_a_out: Amount,
        /// Output of asset B.
        amount_b_out: Amount,
        /// Recipient of the outputs.
        to: Address,
    },
    /// Recorded reserves overwritten.
    Sync {
        /// New reserve of asset A.
        reserve_a: Amount,
        /// New reserve of asset B.
        reserve_b: Amount,
    },
    /// Shares moved, minted (`from` is zero) or burned (`to` is zero).
    Transfer {
        /// Sender.
        from: Address,
        /// Recipient.
        to: Address,
        /// Quantity of shares.
        value: Liquidity,
    },
    /// Share allowance set.
    Approval {
        /// Holder granting the allowance.
        owner: Address,
        /// Party allowed to spend.
        spender: Address,
        /// New allowance.
        value: Liquidity,
    },
}

impl PairEvent {
    /// Short event name, used as a structured logging field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "Mint",
            Self::Burn { .. } => "Burn",
            Self::Swap { .. } => "Swap",
            Self::Sync { .. } => "Sync",
            Self::Transfer { .. } => "Transfer",
            Self::Approval { .. } => "Approval",
        }
    }
}

/// Pending events tagged with sequence numbers, so a rollback can remove
/// exactly the entries it appended.
#[derive(Debug, Default)]
pub(crate) struct EventLog {
    next: u64,
    entries: Vec<(u64, PairEvent)>,
}

impl EventLog {
    /// Appends `events`, returning the sequence numbers assigned.
    pub(crate) fn append(&mut self, events: impl IntoIterator<Item = PairEvent>) -> Vec<u64> {
        events
            .into_iter()
            .map(|event| {
                let seq = self.next;
                self.next += 1;
                self.entries.push((seq, event));
                seq
            })
            .collect()
    }

    /// Drops the entries with the given sequence numbers, if still present.
    pub(crate) fn remove(&mut self, seqs: &[u64]) {
        let seqs: HashSet<u64> = seqs.iter().copied().collect();
        self.entries.retain(|(seq, _)| !seqs.contains(seq));
    }

    /// Drains every entry, oldest first.
    pub(crate) fn drain(&mut self) -> Vec<PairEvent> {
        self.entries.drain(..).map(|(_, event)| event).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync(a: u128) -> PairEvent {
        PairEvent::Sync {
            reserve_a: Amount::new(a),
            reserve_b: Amount::ZERO,
        }
    }

    #[test]
    fn log_removes_only_named_entries() {
        let mut log = EventLog::default();
        let first = log.append([sync(1), sync(2)]);
        let second = log.append([sync(3)]);
        assert_eq!(second, vec![2]);
        log.remove(&first);
        assert_eq!(log.drain(), vec![sync(3)]);
        assert!(log.drain().is_empty());
    }

    #[test]
    fn names() {
        let sync = PairEvent::Sync {
            reserve_a: Amount::ZERO,
            reserve_b: Amount::ZERO,
        };
        assert_eq!(sync.name(), "Sync");
        let approval = PairEvent::Approval {
            owner: Address::ZERO,
            spender: Address::ZERO,
            value: Liquidity::ZERO,
        };
        assert_eq!(approval.name(), "Approval");
    }
}
