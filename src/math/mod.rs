//! Arithmetic utilities for pair accounting.
//!
//! - [`CheckedArithmetic`] — overflow-safe operations on domain newtypes.
//! - [`U256`], [`mul_div`] — 256-bit intermediates for reserve products.
//! - [`isqrt`] — integer square root for share issuance and fee growth.
//! - [`Uq112x112`] — fixed-point prices for the time-weighted oracle.

mod checked;
mod sqrt;
mod uq112x112;
mod wide;

pub use checked::CheckedArithmetic;
pub use sqrt::isqrt;
pub use uq112x112::{Uq112x112, RESOLUTION};
pub use wide::{mul_div, narrow, widen, U256};
