//! Pair configuration.
//!
//! [`PairConfig`] is the declarative blueprint for a pair: which registry
//! created it, which two assets it trades, where it lives, and how its share
//! token is named for permit signatures.

mod pair;

pub use pair::{PairConfig, DEFAULT_DECIMALS, DEFAULT_NAME, DEFAULT_SYMBOL};
