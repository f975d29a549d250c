//! Off-line signed share approvals.
//!
//! A holder signs a structured message granting an allowance; anyone can
//! submit it.  The digest is scoped to one pair on one chain by the domain
//! separator and made single-use by the owner's nonce:
//!
//! ```text
//! domain = keccak256(DOMAIN_TYPEHASH ‖ keccak256(name) ‖ keccak256("1")
//!                    ‖ chain_id ‖ pair_address)
//! struct = keccak256(PERMIT_TYPEHASH ‖ owner ‖ spender ‖ value ‖ nonce ‖ deadline)
//! digest = keccak256(0x19 0x01 ‖ domain ‖ struct)
//! ```
//!
//! Integers are encoded as 32-byte big-endian words.  The owner address is
//! the holder's Ed25519 verifying key and the signature is a 64-byte
//! Ed25519 signature over the digest.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::config::PairConfig;
use crate::domain::{Address, Liquidity};
use crate::error::PairError;

/// Version string of the signing domain.
pub const DOMAIN_VERSION: &str = "1";

/// `keccak256` of the domain type string.
#[must_use]
pub fn domain_typehash() -> [u8; 32] {
    keccak(&[
        &b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)"[..],
    ])
}

/// `keccak256` of the permit type string.
#[must_use]
pub fn permit_typehash() -> [u8; 32] {
    keccak(&[
        &b"Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)"[..],
    ])
}

/// Domain separator binding signatures to one pair on one chain.
#[must_use]
pub fn domain_separator(config: &PairConfig) -> [u8; 32] {
    keccak(&[
        &domain_typehash()[..],
        &keccak(&[config.name().as_bytes()])[..],
        &keccak(&[DOMAIN_VERSION.as_bytes()])[..],
        &word(u128::from(config.chain_id()))[..],
        &config.address().as_bytes()[..],
    ])
}

/// Message digest a holder signs to grant `value` to `spender`.
#[must_use]
pub fn permit_digest(
    domain_separator: &[u8; 32],
    owner: &Address,
    spender: &Address,
    value: Liquidity,
    nonce: u64,
    deadline: u64,
) -> [u8; 32] {
    let struct_hash = keccak(&[
        &permit_typehash()[..],
        &owner.as_bytes()[..],
        &spender.as_bytes()[..],
        &word(value.get())[..],
        &word(u128::from(nonce))[..],
        &word(u128::from(deadline))[..],
    ]);
    keccak(&[&b"\x19\x01"[..], &domain_separator[..], &struct_hash[..]])
}

/// Checks that `signature` over `digest` was produced by `owner`.
///
/// # Errors
///
/// Returns [`PairError::InvalidSignature`] if `owner` is not a valid
/// verifying key or the signature does not verify.
pub fn verify(owner: &Address, digest: &[u8; 32], signature: &[u8; 64]) -> Result<(), PairError> {
    let key =
        VerifyingKey::from_bytes(&owner.as_bytes()).map_err(|_| PairError::InvalidSignature)?;
    let signature = Signature::from_bytes(signature);
    key.verify(digest, &signature)
        .map_err(|_| PairError::InvalidSignature)
}

fn word(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

fn keccak(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
