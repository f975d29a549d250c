//! Time-weighted average prices from a pair's cumulative accumulators.
//!
//! A consumer records a [`PriceObservation`] now and another one later;
//! [`average_prices`] turns the two into the mean price over the window.
//! Because the accumulators wrap modulo 2^256 and timestamps modulo 2^32,
//! only differences are meaningful, and windows must be shorter than
//! 2^32 seconds.
//!
//! [`current_cumulative_prices`] extrapolates the accumulators to the
//! present without touching the pair, so an observation never needs a
//! `sync` first.

use crate::error::PairError;
use crate::math::{Uq112x112, U256};
use crate::pair::Pair;

/// Snapshot of a pair's price accumulators at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceObservation {
    /// Cumulative price of A in B.
    pub price_a_cumulative: U256,
    /// Cumulative price of B in A.
    pub price_b_cumulative: U256,
    /// Oracle timestamp (seconds modulo 2^32).
    pub timestamp: u32,
}

impl PriceObservation {
    /// Observes `pair` at its clock's current time.
    #[must_use]
    pub fn observe(pair: &Pair) -> Self {
        current_cumulative_prices(pair, pair.timestamp())
    }
}

/// Accumulators as they would read if the pair synced at `now`.
#[must_use]
pub fn current_cumulative_prices(pair: &Pair, now: u32) -> PriceObservation {
    let (price_a_cumulative, price_b_cumulative) = pair.reserve_state().cumulative_prices_at(now);
    PriceObservation {
        price_a_cumulative,
        price_b_cumulative,
        timestamp: now,
    }
}

/// Mean prices of A in B and B in A between two observations.
///
/// # Errors
///
/// Returns [`PairError::OracleWindowEmpty`] if both observations share a
/// timestamp.
pub fn average_prices(
    older: &PriceObservation,
    newer: &PriceObservation,
) -> Result<(Uq112x112, Uq112x112), PairError> {
    let elapsed = newer.timestamp.wrapping_sub(older.timestamp);
    if elapsed == 0 {
        return Err(PairError::OracleWindowEmpty);
    }
    let elapsed = U256::from(elapsed);
    let delta_a = newer
        .price_a_cumulative
        .overflowing_sub(older.price_a_cumulative)
        .0;
    let delta_b = newer
        .price_b_cumulative
        .overflowing_sub(older.price_b_cumulative)
        .0;
    Ok((
        Uq112x112::from_raw(delta_a / elapsed),
        Uq112x112::from_raw(delta_b / elapsed),
    ))
}

/// Converts `amount_in` at an averaged `price`, truncating.
///
/// # Errors
///
/// Returns [`PairError::Overflow`] if the result exceeds `u128`.
pub fn consult(price: &Uq112x112, amount_in: u128) -> Result<u128, PairError> {
    price
        .mul_decode(amount_in)
        .ok_or(PairError::Overflow("consulted amount exceeds u128"))
}
