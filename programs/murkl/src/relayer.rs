//! Relayer boundary
//!
//! Off-chain side of a claim: decode the wire request a relayer receives and
//! plan the buffer uploads it has to send. Nothing here runs on-chain.

use std::str::FromStr;

use anchor_lang::prelude::Pubkey;
use thiserror::Error;

use crate::config::BufferLimits;
use crate::crypto::verifier::PublicInputs;
use crate::state::{DepositRecord, NullifierRecord, Pool, ProofBuffer};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelayerError {
    #[error("{field}: invalid hex: {source}")]
    InvalidHex {
        field: &'static str,
        source: hex::FromHexError,
    },

    #[error("{field}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{field}: invalid base58 public key")]
    InvalidPubkey { field: &'static str },

    #[error("proof is empty")]
    EmptyProof,

    #[error("proof is {len} bytes, limit is {max}")]
    ProofTooLarge { len: usize, max: u32 },

    #[error("chunk size must be non-zero")]
    ZeroChunkSize,
}

/// Claim request as it arrives at the relayer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimRequest {
    /// Hex transcript, optional `0x` prefix.
    pub proof: String,
    pub commitment: String,
    pub nullifier: String,
    pub merkle_root: String,
    pub leaf_index: u64,
    /// Base58
    pub recipient_token_account: String,
    /// Base58
    pub pool_address: String,
    pub fee_bps: u16,
}

/// Decoded, typed claim request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimSubmission {
    pub proof: Vec<u8>,
    pub inputs: PublicInputs,
    pub leaf_index: u64,
    pub recipient_token_account: Pubkey,
    pub pool: Pubkey,
    pub fee_bps: u16,
}

/// One `upload_chunk` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofChunk<'a> {
    pub offset: u32,
    pub data: &'a [u8],
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, RelayerError> {
    let trimmed = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(trimmed).map_err(|source| RelayerError::InvalidHex { field, source })
}

fn decode_hash(field: &'static str, value: &str) -> Result<[u8; 32], RelayerError> {
    let bytes = decode_hex(field, value)?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| RelayerError::InvalidLength {
        field,
        expected: 32,
        actual: bytes.len(),
    })
}

fn decode_pubkey(field: &'static str, value: &str) -> Result<Pubkey, RelayerError> {
    Pubkey::from_str(value).map_err(|_| RelayerError::InvalidPubkey { field })
}

impl ClaimRequest {
    pub fn decode(&self) -> Result<ClaimSubmission, RelayerError> {
        let proof = decode_hex("proof", &self.proof)?;
        if proof.is_empty() {
            return Err(RelayerError::EmptyProof);
        }
        let inputs = PublicInputs::new(
            decode_hash("commitment", &self.commitment)?,
            decode_hash("nullifier", &self.nullifier)?,
            decode_hash("merkle_root", &self.merkle_root)?,
        );

        Ok(ClaimSubmission {
            proof,
            inputs,
            leaf_index: self.leaf_index,
            recipient_token_account: decode_pubkey(
                "recipient_token_account",
                &self.recipient_token_account,
            )?,
            pool: decode_pubkey("pool_address", &self.pool_address)?,
            fee_bps: self.fee_bps,
        })
    }
}

impl ClaimSubmission {
    /// Chunks for a buffer created with `limits` (read from `Pool::buffer_limits`).
    pub fn upload_plan(&self, limits: &BufferLimits) -> Result<Vec<ProofChunk<'_>>, RelayerError> {
        if self.proof.len() > limits.max_proof_size as usize {
            return Err(RelayerError::ProofTooLarge {
                len: self.proof.len(),
                max: limits.max_proof_size,
            });
        }
        plan_chunks(&self.proof, limits.max_chunk_size)
    }

    pub fn deposit_address(&self, program_id: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[
                DepositRecord::SEED_PREFIX,
                self.pool.as_ref(),
                &self.leaf_index.to_le_bytes(),
            ],
            program_id,
        )
        .0
    }

    pub fn nullifier_address(&self, program_id: &Pubkey) -> Pubkey {
        NullifierRecord::find_pda(program_id, &self.pool, &self.inputs.nullifier).0
    }
}

/// Pool PDA for a token mint.
pub fn pool_address(program_id: &Pubkey, token_mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[Pool::SEED_PREFIX, token_mint.as_ref()], program_id).0
}

/// Buffer PDA for `owner`'s upload slot `buffer_id`.
pub fn proof_buffer_address(program_id: &Pubkey, owner: &Pubkey, buffer_id: u64) -> Pubkey {
    Pubkey::find_program_address(
        &[
            ProofBuffer::SEED_PREFIX,
            owner.as_ref(),
            &buffer_id.to_le_bytes(),
        ],
        program_id,
    )
    .0
}

/// Split `proof` into sequential, non-overlapping chunks of at most
/// `max_chunk_size` bytes that cover it exactly once.
pub fn plan_chunks(proof: &[u8], max_chunk_size: u32) -> Result<Vec<ProofChunk<'_>>, RelayerError> {
    if max_chunk_size == 0 {
        return Err(RelayerError::ZeroChunkSize);
    }
    if proof.is_empty() {
        return Err(RelayerError::EmptyProof);
    }
    let max_len = u32::MAX as usize;
    if proof.len() > max_len {
        return Err(RelayerError::ProofTooLarge {
            len: proof.len(),
            max: u32::MAX,
        });
    }

    let step = max_chunk_size as usize;
    Ok(proof
        .chunks(step)
        .enumerate()
        .map(|(i, data)| ProofChunk {
            offset: (i * step) as u32,
            data,
        })
        .collect())
}
