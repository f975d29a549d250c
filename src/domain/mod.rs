//! Fundamental domain value types.
//!
//! Identities, asset amounts, share quantities and canonically ordered
//! asset pairs.  All types are newtypes with validated constructors.

mod address;
mod amount;
mod liquidity;
mod token_pair;

pub use address::Address;
pub use amount::Amount;
pub use liquidity::Liquidity;
pub use token_pair::TokenPair;
