//! Hash Functions for Murkl
//!
//! # Derivation Scheme (V1)
//! Every commitment and nullifier derivation goes through one shared,
//! domain-separated Keccak256 primitive:
//! ```text
//! id_hash     = M31(keccak("murkl_identifier_v1" || lowercase(identifier)))
//! secret_hash = M31(keccak("murkl_password_v1"   || password))
//! commitment  = keccak("murkl_m31_hash_v1" || id_hash_le32 || secret_hash_le32)
//! nullifier   = keccak("murkl_nullifier_v1" || secret_hash_le32 || leaf_index_le32)
//! ```
//! `M31(d)` reduces the first four little-endian digest bytes modulo 2^31 - 1.
//! Commitments and nullifiers are opaque 32-byte digests, not field elements.
//! Both payloads are two LE words, so they carry separate tags: `(a, b)` as a
//! commitment and `(a, b)` as a nullifier must hash to different values.
//!
//! # Merkle Tree
//! Internal nodes are `keccak(left || right)`, leaves are `keccak(value)`.

use anchor_lang::prelude::*;
use solana_program::keccak;

use crate::crypto::m31::{M31, QM31};
use crate::error::MurklError;

// ============================================================================
// DOMAIN SEPARATION
// ============================================================================

/// Domain-separation tags for one version of the derivation scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivationScheme {
    pub identifier_domain: &'static [u8],
    pub password_domain: &'static [u8],
    pub m31_hash_domain: &'static [u8],
    pub nullifier_domain: &'static [u8],
}

pub const IDENTIFIER_DOMAIN: &[u8] = b"murkl_identifier_v1";
pub const PASSWORD_DOMAIN: &[u8] = b"murkl_password_v1";
pub const M31_HASH_DOMAIN: &[u8] = b"murkl_m31_hash_v1";
pub const NULLIFIER_DOMAIN: &[u8] = b"murkl_nullifier_v1";

impl DerivationScheme {
    pub const V1: DerivationScheme = DerivationScheme {
        identifier_domain: IDENTIFIER_DOMAIN,
        password_domain: PASSWORD_DOMAIN,
        m31_hash_domain: M31_HASH_DOMAIN,
        nullifier_domain: NULLIFIER_DOMAIN,
    };

    /// Scheme in force for this program build.
    pub const CURRENT: DerivationScheme = Self::V1;

    pub fn hash_identifier(&self, identifier: &str) -> M31 {
        let normalized = identifier.to_lowercase();
        M31::from_digest(&domain_hash(self.identifier_domain, &[normalized.as_bytes()]))
    }

    pub fn hash_password(&self, password: &str) -> M31 {
        M31::from_digest(&domain_hash(self.password_domain, &[password.as_bytes()]))
    }

    pub fn compute_commitment(&self, id_hash: M31, secret_hash: M31) -> [u8; 32] {
        domain_hash(
            self.m31_hash_domain,
            &[&id_hash.to_le_bytes(), &secret_hash.to_le_bytes()],
        )
    }

    /// Leaf indices are u64 pool-wide but enter the derivation as 4 LE bytes;
    /// anything that would truncate is rejected.
    pub fn compute_nullifier(&self, secret_hash: M31, leaf_index: u64) -> Result<[u8; 32]> {
        let narrow = u32::try_from(leaf_index).map_err(|_| error!(MurklError::LeafIndexOverflow))?;
        Ok(domain_hash(
            self.nullifier_domain,
            &[&secret_hash.to_le_bytes(), &narrow.to_le_bytes()],
        ))
    }
}

/// keccak(domain || parts[0] || parts[1] || ...)
fn domain_hash(domain: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut vals: Vec<&[u8]> = Vec::with_capacity(parts.len() + 1);
    vals.push(domain);
    vals.extend_from_slice(parts);
    keccak::hashv(&vals).to_bytes()
}

// ============================================================================
// COMMITMENT / NULLIFIER (current scheme)
// ============================================================================

/// Hash an identifier (case-insensitive) to a field element.
pub fn hash_identifier(identifier: &str) -> M31 {
    DerivationScheme::CURRENT.hash_identifier(identifier)
}

/// Hash a password to a field element.
pub fn hash_password(password: &str) -> M31 {
    DerivationScheme::CURRENT.hash_password(password)
}

/// Commitment binding identifier and secret.
pub fn compute_commitment(id_hash: M31, secret_hash: M31) -> [u8; 32] {
    DerivationScheme::CURRENT.compute_commitment(id_hash, secret_hash)
}

/// Nullifier revealed when claiming the deposit at `leaf_index`.
pub fn compute_nullifier(secret_hash: M31, leaf_index: u64) -> Result<[u8; 32]> {
    DerivationScheme::CURRENT.compute_nullifier(secret_hash, leaf_index)
}

// ============================================================================
// MERKLE HASHES
// ============================================================================

/// Parent node hash: keccak(left || right).
pub fn hash_two_to_one(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    keccak::hashv(&[left.as_ref(), right.as_ref()]).to_bytes()
}

/// Leaf hash for an opened 32-byte value.
pub fn hash_leaf(value: &[u8; 32]) -> [u8; 32] {
    keccak::hash(value).to_bytes()
}

/// Leaf hash for an opened FRI coset of four QM31 values.
pub fn hash_fri_leaf(siblings: &[QM31; 4]) -> [u8; 32] {
    let encoded: Vec<[u8; 16]> = siblings.iter().map(QM31::to_le_bytes).collect();
    let parts: Vec<&[u8]> = encoded.iter().map(|b| b.as_ref()).collect();
    keccak::hashv(&parts).to_bytes()
}

/// Check if a 32-byte value is all zeros.
#[inline]
pub fn is_zero_hash(hash: &[u8; 32]) -> bool {
    hash.iter().all(|&b| b == 0)
}

// ============================================================================
// TESTS
// ============================================================================
