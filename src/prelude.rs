//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use pair_amm::prelude::*;
//! ```

pub use crate::config::PairConfig;
pub use crate::domain::{Address, Amount, Liquidity, TokenPair};
pub use crate::error::{PairError, Result};
pub use crate::events::PairEvent;
pub use crate::host::{FeeSwitch, ManualClock, MemoryLedger, SystemClock, TransferStyle};
pub use crate::library::{get_amount_in, get_amount_out, quote};
pub use crate::math::{CheckedArithmetic, Uq112x112};
pub use crate::oracle::{average_prices, PriceObservation};
pub use crate::pair::{Pair, Reserves, MINIMUM_LIQUIDITY};
pub use crate::traits::{AssetLedger, Clock, FeeRecipientSource, SwapCallee, TransferReceipt};
