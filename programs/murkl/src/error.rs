//! Unified error types for the Murkl program
//!
//! Error codes are stable across versions so relayers can decide whether a
//! failed step is worth retrying. Never reorder variants; append only.

use anchor_lang::prelude::*;

#[error_code]
pub enum MurklError {
    // ========== Proof Buffer Errors ==========

    /// Expected size is zero, over the configured maximum, or the chunk is empty
    #[msg("Invalid size for proof buffer or chunk")]
    InvalidSize, // 6000

    /// Caller does not own the buffer or is not the pool admin
    #[msg("Unauthorized caller")]
    Unauthorized, // 6001

    /// Buffer was already finalized; it is now read-only
    #[msg("Proof buffer already finalized")]
    AlreadyFinalized, // 6002

    /// Chunk would write past the end of the buffer
    #[msg("Chunk write out of bounds")]
    OutOfBounds, // 6003

    /// Uploaded size does not match the declared size
    #[msg("Uploaded size does not match expected size")]
    SizeMismatch, // 6004

    // ========== Proof Errors ==========

    /// Transcript is truncated or has trailing bytes
    #[msg("Malformed proof transcript")]
    MalformedProof, // 6005

    /// Verifier rejected the proof for the supplied public inputs
    #[msg("Proof verification failed")]
    ConstraintViolation, // 6006

    // ========== Claim Errors ==========

    /// Proven commitment differs from the deposit's commitment
    #[msg("Commitment does not match deposit record")]
    CommitmentMismatch, // 6007

    /// Deposit has already been claimed
    #[msg("Deposit already claimed")]
    AlreadyClaimed, // 6008

    /// Proven root was not held by the pool at or after the deposit
    #[msg("Merkle root is unknown or predates the deposit")]
    StaleMerkleRoot, // 6009

    /// Nullifier has already been spent in this pool
    #[msg("Nullifier already used")]
    NullifierAlreadyUsed, // 6010

    /// Requested relayer fee exceeds the pool maximum
    #[msg("Relayer fee exceeds pool maximum")]
    FeeExceedsMax, // 6011

    // ========== Supplementary ==========

    /// Size reached the expected size but some bytes were never written
    #[msg("Proof upload has unwritten gaps")]
    IncompleteUpload, // 6012

    /// Chunk is larger than the configured transport limit
    #[msg("Chunk exceeds maximum chunk size")]
    ChunkTooLarge, // 6013

    /// Claim attempted against a buffer that was never finalized
    #[msg("Proof buffer is not finalized")]
    BufferNotFinalized, // 6014

    /// Public inputs cannot be all zeros
    #[msg("Invalid public inputs")]
    InvalidPublicInputs, // 6015

    /// Leaf index does not fit the 4-byte nullifier derivation input
    #[msg("Leaf index exceeds 32-bit derivation width")]
    LeafIndexOverflow, // 6016

    #[msg("Pool is paused")]
    PoolPaused, // 6017

    #[msg("Invalid amount")]
    InvalidAmount, // 6018

    #[msg("Invalid commitment: cannot be all zeros")]
    InvalidCommitment, // 6019

    #[msg("Merkle tree is full")]
    MerkleTreeFull, // 6020

    #[msg("Tree depth must be between 4 and 24")]
    InvalidTreeDepth, // 6021

    #[msg("Root history size must be between 30 and 200")]
    InvalidRootHistorySize, // 6022

    #[msg("Max relayer fee must not exceed 10000 bps")]
    InvalidFeeConfig, // 6023

    #[msg("Insufficient vault balance")]
    InsufficientBalance, // 6024

    #[msg("Token mint does not match pool configuration")]
    InvalidMint, // 6025

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow, // 6026

    #[msg("Buffer limits must satisfy 0 < max_chunk_size <= max_proof_size <= 8192")]
    InvalidBufferLimits, // 6027
}
