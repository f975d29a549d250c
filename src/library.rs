//! Off-pair pricing helpers.
//!
//! Routers and callers use these to size the amounts they send before
//! calling [`Pair::swap`](crate::pair::Pair::swap) or
//! [`Pair::mint`](crate::pair::Pair::mint).  They read nothing but their
//! arguments and agree exactly with the pair's fee-adjusted product check:
//! an output computed by [`get_amount_out`] always passes it.
//!
//! # Exact-in (fee 0.3% of input)
//!
//! ```text
//! amount_out = in·997·reserve_out / (reserve_in·1000 + in·997)
//! ```
//!
//! # Exact-out
//!
//! ```text
//! amount_in = reserve_in·out·1000 / ((reserve_out − out)·997) + 1
//! ```

use crate::domain::{Address, Amount, TokenPair};
use crate::error::PairError;
use crate::math::{narrow, widen, U256};

const FEE_DENOMINATOR: u32 = 1_000;
const FEE_COMPLEMENT: u32 = 997;

/// Sorts two asset addresses into the order pairs use internally.
///
/// # Errors
///
/// Returns [`PairError::InvalidToken`] for identical or zero addresses.
pub fn sort_tokens(token_x: Address, token_y: Address) -> Result<(Address, Address), PairError> {
    let pair = TokenPair::new(token_x, token_y)?;
    Ok((pair.token_a(), pair.token_b()))
}

/// Amount of the other asset equal in value at the current reserve ratio.
///
/// # Errors
///
/// - [`PairError::InsufficientAmount`] if `amount_a` is zero.
/// - [`PairError::InsufficientLiquidity`] if either reserve is zero.
/// - [`PairError::Overflow`] if the result exceeds `u128`.
pub fn quote(amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount, PairError> {
    if amount_a.is_zero() {
        return Err(PairError::InsufficientAmount);
    }
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(PairError::InsufficientLiquidity);
    }
    let out = widen(amount_a.get()) * widen(reserve_b.get()) / widen(reserve_a.get());
    to_amount(out, "quote exceeds u128")
}

/// Maximum output for `amount_in`, after the 0.3% input fee.
///
/// # Errors
///
/// - [`PairError::InsufficientInputAmount`] if `amount_in` is zero.
/// - [`PairError::InsufficientLiquidity`] if either reserve is zero.
/// - [`PairError::Overflow`] if an intermediate product exceeds 256 bits.
pub fn get_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> Result<Amount, PairError> {
    if amount_in.is_zero() {
        return Err(PairError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(PairError::InsufficientLiquidity);
    }
    let amount_in_with_fee = widen(amount_in.get()) * U256::from(FEE_COMPLEMENT);
    let numerator = amount_in_with_fee
        .checked_mul(widen(reserve_out.get()))
        .ok_or(PairError::Overflow("amount out numerator"))?;
    let denominator = widen(reserve_in.get()) * U256::from(FEE_DENOMINATOR) + amount_in_with_fee;
    to_amount(numerator / denominator, "amount out exceeds u128")
}

/// Minimum input required to receive `amount_out`, after the 0.3% fee.
///
/// Rounds up by adding one, so the pair never receives less than it needs.
///
/// # Errors
///
/// - [`PairError::InsufficientOutputAmount`] if `amount_out` is zero.
/// - [`PairError::InsufficientLiquidity`] if either reserve is zero or
///   `amount_out` is not below `reserve_out`.
/// - [`PairError::Overflow`] if the result exceeds `u128`.
pub fn get_amount_in(
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> Result<Amount, PairError> {
    if amount_out.is_zero() {
        return Err(PairError::InsufficientOutputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(PairError::InsufficientLiquidity);
    }
    let numerator = (widen(reserve_in.get()) * widen(amount_out.get()))
        .checked_mul(U256::from(FEE_DENOMINATOR))
        .ok_or(PairError::Overflow("amount in numerator"))?;
    let denominator =
        widen(reserve_out.saturating_sub(&amount_out).get()) * U256::from(FEE_COMPLEMENT);
    to_amount(numerator / denominator + U256::one(), "amount in exceeds u128")
}

fn to_amount(value: U256, context: &'static str) -> Result<Amount, PairError> {
    narrow(value).map(Amount::new).ok_or(PairError::Overflow(context))
}
