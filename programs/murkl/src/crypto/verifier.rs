//! Proof verification for finalized transcripts
//!
//! The proof buffer hands a decoded [`StarkProof`] and the claimed public
//! inputs to a [`ProofVerifier`]. Two implementations ship:
//!
//! - [`StarkVerifier`] checks transcript shape, canonical field encodings,
//!   Fiat-Shamir query derivation bound to the public inputs, and every Merkle
//!   opening against its commitment.
//! - [`AcceptAllVerifier`] accepts anything. Protocol-layer tests and
//!   `dev-mode` builds only.
//!
//! AIR constraint evaluation is outside this module; a verifier that adds it
//! plugs in through the same trait.

use anchor_lang::prelude::*;
use thiserror::Error;

use crate::crypto::channel::Channel;
use crate::crypto::hash::{hash_fri_leaf, hash_leaf, hash_two_to_one, is_zero_hash};
use crate::crypto::transcript::StarkProof;
use crate::error::MurklError;

// ============================================================================
// PUBLIC INPUTS
// ============================================================================

/// Values a claim proof is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicInputs {
    pub commitment: [u8; 32],
    pub nullifier: [u8; 32],
    pub merkle_root: [u8; 32],
}

impl PublicInputs {
    pub fn new(commitment: [u8; 32], nullifier: [u8; 32], merkle_root: [u8; 32]) -> Self {
        Self {
            commitment,
            nullifier,
            merkle_root,
        }
    }

    /// None of the inputs may be all zeros.
    pub fn validate(&self) -> Result<()> {
        require!(
            !is_zero_hash(&self.commitment)
                && !is_zero_hash(&self.nullifier)
                && !is_zero_hash(&self.merkle_root),
            MurklError::InvalidPublicInputs
        );
        Ok(())
    }

    /// Absorb in canonical order: commitment, nullifier, root.
    pub fn mix_into(&self, channel: &mut Channel) {
        channel.mix(&self.commitment);
        channel.mix(&self.nullifier);
        channel.mix(&self.merkle_root);
    }
}

// ============================================================================
// VERIFIER TRAIT
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("proof has {actual} queries, at least {required} required")]
    TooFewQueries { actual: usize, required: u8 },

    #[error("proof has no FRI layers")]
    MissingFriLayers,

    #[error("log domain size {log_domain} outside [{min}, {max}]")]
    DomainSize { log_domain: usize, min: usize, max: u8 },

    #[error("final polynomial length {len} outside [1, {max}]")]
    FinalPolyLength { len: usize, max: u16 },

    #[error("non-canonical field element in {location}")]
    NonCanonicalField { location: &'static str },

    #[error("query {query}: index {actual} does not match derived index {expected}")]
    QueryIndexMismatch { query: usize, expected: u32, actual: u32 },

    #[error("query {query}: {opening} path has length {actual}, expected {expected}")]
    PathLength {
        query: usize,
        opening: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("query {query}: {opening} opening does not authenticate")]
    BadOpening { query: usize, opening: &'static str },
}

/// Cryptographic acceptance of a decoded transcript.
pub trait ProofVerifier {
    fn verify(&self, proof: &StarkProof, inputs: &PublicInputs) -> std::result::Result<(), VerifyError>;
}

/// Accepts every transcript. Never use in production.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllVerifier;

impl ProofVerifier for AcceptAllVerifier {
    fn verify(&self, _proof: &StarkProof, _inputs: &PublicInputs) -> std::result::Result<(), VerifyError> {
        Ok(())
    }
}

// ============================================================================
// STARK VERIFIER
// ============================================================================

/// Query indices are u32, so the domain is at most 2^31.
pub const MAX_LOG_DOMAIN: u8 = 31;

/// Verifier policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifierConfig {
    pub min_queries: u8,
    pub max_log_domain: u8,
    pub max_final_poly_len: u16,
}

impl VerifierConfig {
    pub const DEFAULT: VerifierConfig = VerifierConfig {
        min_queries: 4,
        max_log_domain: 24,
        max_final_poly_len: 64,
    };
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StarkVerifier {
    pub config: VerifierConfig,
}

impl StarkVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    fn check_shape(&self, proof: &StarkProof) -> std::result::Result<usize, VerifyError> {
        let cfg = &self.config;

        if proof.queries.len() < cfg.min_queries as usize || proof.queries.is_empty() {
            return Err(VerifyError::TooFewQueries {
                actual: proof.queries.len(),
                required: cfg.min_queries.max(1),
            });
        }
        let n_layers = proof.fri_layer_commitments.len();
        if n_layers == 0 {
            return Err(VerifyError::MissingFriLayers);
        }

        let log_domain = proof.queries[0].trace_path.len();
        let min = 2 * n_layers;
        let max = cfg.max_log_domain.min(MAX_LOG_DOMAIN);
        if log_domain < min || log_domain > max as usize {
            return Err(VerifyError::DomainSize {
                log_domain,
                min,
                max,
            });
        }

        let poly_len = proof.final_poly.len();
        if poly_len == 0 || poly_len > cfg.max_final_poly_len as usize {
            return Err(VerifyError::FinalPolyLength {
                len: poly_len,
                max: cfg.max_final_poly_len,
            });
        }

        if !proof.trace_oods.is_canonical() || !proof.composition_oods.is_canonical() {
            return Err(VerifyError::NonCanonicalField { location: "oods" });
        }
        if !proof.final_poly.iter().all(|c| c.is_canonical()) {
            return Err(VerifyError::NonCanonicalField { location: "final_poly" });
        }
        let fri_values_canonical = proof
            .queries
            .iter()
            .flat_map(|q| q.fri_layers.iter())
            .flat_map(|layer| layer.siblings.iter())
            .all(|s| s.is_canonical());
        if !fri_values_canonical {
            return Err(VerifyError::NonCanonicalField { location: "fri_siblings" });
        }

        Ok(log_domain)
    }
}

/// Replay the prover's channel and draw one index per query.
pub fn derive_query_indices(
    proof: &StarkProof,
    inputs: &PublicInputs,
    log_domain: usize,
    n_queries: usize,
) -> Vec<u32> {
    let mut channel = Channel::new();
    inputs.mix_into(&mut channel);
    channel.mix(&proof.trace_commitment);
    channel.mix(&proof.composition_commitment);
    channel.mix(&proof.trace_oods.to_le_bytes());
    channel.mix(&proof.composition_oods.to_le_bytes());
    for commitment in &proof.fri_layer_commitments {
        channel.mix(commitment);
    }
    for coeff in &proof.final_poly {
        channel.mix(&coeff.to_le_bytes());
    }

    let mask = domain_mask(log_domain);
    (0..n_queries).map(|_| channel.draw_u32() & mask).collect()
}

fn domain_mask(log_domain: usize) -> u32 {
    if log_domain >= 32 {
        u32::MAX
    } else {
        (1u32 << log_domain) - 1
    }
}

/// Walk a sibling path from `leaf` at `index` and compare with `root`.
pub fn verify_merkle_path(leaf: [u8; 32], index: u32, path: &[[u8; 32]], root: &[u8; 32]) -> bool {
    let mut node = leaf;
    let mut idx = index;
    for sibling in path {
        node = if idx & 1 == 0 {
            hash_two_to_one(&node, sibling)
        } else {
            hash_two_to_one(sibling, &node)
        };
        idx >>= 1;
    }
    idx == 0 && node == *root
}

impl ProofVerifier for StarkVerifier {
    fn verify(&self, proof: &StarkProof, inputs: &PublicInputs) -> std::result::Result<(), VerifyError> {
        let log_domain = self.check_shape(proof)?;
        let expected = derive_query_indices(proof, inputs, log_domain, proof.queries.len());

        for (qi, (query, &derived)) in proof.queries.iter().zip(expected.iter()).enumerate() {
            if query.index != derived {
                return Err(VerifyError::QueryIndexMismatch {
                    query: qi,
                    expected: derived,
                    actual: query.index,
                });
            }

            check_path_len(qi, "trace", query.trace_path.len(), log_domain)?;
            if !verify_merkle_path(
                hash_leaf(&query.trace_value),
                query.index,
                &query.trace_path,
                &proof.trace_commitment,
            ) {
                return Err(VerifyError::BadOpening { query: qi, opening: "trace" });
            }

            check_path_len(qi, "composition", query.composition_path.len(), log_domain)?;
            if !verify_merkle_path(
                hash_leaf(&query.composition_value),
                query.index,
                &query.composition_path,
                &proof.composition_commitment,
            ) {
                return Err(VerifyError::BadOpening { query: qi, opening: "composition" });
            }

            for (layer_idx, (opening, commitment)) in query
                .fri_layers
                .iter()
                .zip(proof.fri_layer_commitments.iter())
                .enumerate()
            {
                // Each layer folds by four: drop two index bits per layer.
                let shift = 2 * (layer_idx + 1);
                check_path_len(qi, "fri_layer", opening.path.len(), log_domain - shift)?;
                if !verify_merkle_path(
                    hash_fri_leaf(&opening.siblings),
                    query.index >> shift,
                    &opening.path,
                    commitment,
                ) {
                    return Err(VerifyError::BadOpening { query: qi, opening: "fri_layer" });
                }
            }
        }

        Ok(())
    }
}

fn check_path_len(
    query: usize,
    opening: &'static str,
    actual: usize,
    expected: usize,
) -> std::result::Result<(), VerifyError> {
    if actual != expected {
        return Err(VerifyError::PathLength {
            query,
            opening,
            actual,
            expected,
        });
    }
    Ok(())
}
