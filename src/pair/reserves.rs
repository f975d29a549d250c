//! Recorded reserves and the time-weighted price accumulators.
//!
//! [`ReserveState`] is the pair's source of truth.  Its only writer is
//! [`ReserveState::synced`], invoked exactly once per mint, burn, swap or
//! sync; it returns an updated copy so callers can validate everything
//! before committing.

use tracing::trace;

use crate::domain::Amount;
use crate::error::PairError;
use crate::math::{widen, Uq112x112, U256};

/// Truncates wall-clock seconds to the 32-bit oracle timestamp.
#[must_use]
pub fn truncate_timestamp(now: u64) -> u32 {
    (now & u64::from(u32::MAX)) as u32
}

/// Public snapshot of the recorded reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Reserves {
    /// Recorded reserve of asset A.
    pub reserve_a: Amount,
    /// Recorded reserve of asset B.
    pub reserve_b: Amount,
    /// Oracle timestamp (seconds modulo 2^32) of the last sync.
    pub block_timestamp_last: u32,
}

impl Reserves {
    /// `reserve_a × reserve_b` as a 256-bit value.
    #[must_use]
    pub fn product(&self) -> U256 {
        widen(self.reserve_a.get()) * widen(self.reserve_b.get())
    }

    /// Returns `true` when the pair holds no recorded liquidity.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.reserve_a.is_zero() && self.reserve_b.is_zero()
    }
}

/// Reserve, oracle and protocol-fee checkpoint state of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReserveState {
    reserves: Reserves,
    price_a_cumulative_last: U256,
    price_b_cumulative_last: U256,
    k_last: U256,
}

impl ReserveState {
    /// Recorded reserves and timestamp.
    #[must_use]
    pub const fn reserves(&self) -> Reserves {
        self.reserves
    }

    /// Accumulated price of A in terms of B (UQ112x112 × seconds, wrapping).
    #[must_use]
    pub const fn price_a_cumulative_last(&self) -> U256 {
        self.price_a_cumulative_last
    }

    /// Accumulated price of B in terms of A (UQ112x112 × seconds, wrapping).
    #[must_use]
    pub const fn price_b_cumulative_last(&self) -> U256 {
        self.price_b_cumulative_last
    }

    /// Reserve product recorded after the last liquidity event with the
    /// protocol fee on; zero otherwise.
    #[must_use]
    pub const fn k_last(&self) -> U256 {
        self.k_last
    }

    /// Returns a copy with `k_last` replaced.
    #[must_use]
    pub const fn with_k_last(mut self, k_last: U256) -> Self {
        self.k_last = k_last;
        self
    }

    /// Accumulators as they would read at `now` if a sync happened then.
    ///
    /// Uses the recorded reserves as the prices that held since the last
    /// sync.  Does not mutate anything.
    #[must_use]
    pub fn cumulative_prices_at(&self, now: u32) -> (U256, U256) {
        let elapsed = now.wrapping_sub(self.reserves.block_timestamp_last);
        accumulate(
            self.price_a_cumulative_last,
            self.price_b_cumulative_last,
            self.reserves.reserve_a,
            self.reserves.reserve_b,
            elapsed,
        )
    }

    /// Computes the state after recording new balances.
    ///
    /// `previous_a` / `previous_b` are the reserves read at the start of the
    /// calling operation; they price the interval since the last sync.  If
    /// time has passed and both are non-zero, each accumulator grows by
    /// `elapsed × opposite / same` in UQ112x112, wrapping modulo 2^256.
    /// Reserves and timestamp are then overwritten unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::ReserveOverflow`] if either balance does not fit
    /// in 112 bits.  `self` is left untouched in that case.
    pub fn synced(
        &self,
        balance_a: Amount,
        balance_b: Amount,
        previous_a: Amount,
        previous_b: Amount,
        now: u32,
    ) -> Result<Self, PairError> {
        if !balance_a.fits_reserve() || !balance_b.fits_reserve() {
            return Err(PairError::ReserveOverflow);
        }

        let elapsed = now.wrapping_sub(self.reserves.block_timestamp_last);
        let (price_a_cumulative_last, price_b_cumulative_last) = accumulate(
            self.price_a_cumulative_last,
            self.price_b_cumulative_last,
            previous_a,
            previous_b,
            elapsed,
        );

        Ok(Self {
            reserves: Reserves {
                reserve_a: balance_a,
                reserve_b: balance_b,
                block_timestamp_last: now,
            },
            price_a_cumulative_last,
            price_b_cumulative_last,
            k_last: self.k_last,
        })
    }
}

fn accumulate(
    price_a_cumulative: U256,
    price_b_cumulative: U256,
    reserve_a: Amount,
    reserve_b: Amount,
    elapsed: u32,
) -> (U256, U256) {
    if elapsed == 0 || reserve_a.is_zero() || reserve_b.is_zero() {
        return (price_a_cumulative, price_b_cumulative);
    }
    // Both reserves are non-zero, so neither division can fail.
    let price_a = Uq112x112::encode(reserve_b.get())
        .uqdiv(reserve_a.get())
        .unwrap_or(Uq112x112::ZERO);
    let price_b = Uq112x112::encode(reserve_a.get())
        .uqdiv(reserve_b.get())
        .unwrap_or(Uq112x112::ZERO);

    trace!(elapsed, %price_a, %price_b, "accumulating oracle prices");

    (
        price_a_cumulative
            .overflowing_add(price_a.wrapping_mul_elapsed(elapsed))
            .0,
        price_b_cumulative
            .overflowing_add(price_b.wrapping_mul_elapsed(elapsed))
            .0,
    )
}
