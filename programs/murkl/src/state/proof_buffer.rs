//! Proof buffer account
//!
//! A STARK transcript is too large for one transaction, so the relayer
//! streams it into a buffer in offset-addressed chunks and then finalizes it.
//!
//! # Lifecycle
//! ```text
//! create ──► Receiving ──finalize_and_verify──► Finalized
//!               │                                   │
//!               └───────────── close ◄──────────────┘
//! ```
//! Chunks may arrive in any order and may overlap (last write wins). A
//! one-bit-per-byte coverage map records which bytes were written; finalize
//! requires every byte covered, so `size == expected_size` alone is never
//! enough.
//!
//! Every transition validates all preconditions before mutating anything.

use anchor_lang::prelude::*;

use crate::config::BufferLimits;
use crate::crypto::transcript::StarkProof;
use crate::crypto::verifier::{ProofVerifier, PublicInputs};
use crate::error::MurklError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferState {
    Receiving,
    Finalized,
}

/// PDA Seeds: `[b"proof_buffer", owner.key().as_ref(), buffer_id.to_le_bytes()]`
#[account]
#[derive(Default, Debug)]
pub struct ProofBuffer {
    /// Only signer allowed to write, finalize or close
    pub owner: Pubkey,

    /// Pool whose buffer limits apply to uploads
    pub pool: Pubkey,

    /// Transcript length fixed at creation
    pub expected_size: u32,

    /// High-water mark of written bytes
    pub size: u32,

    pub finalized: bool,

    /// Verified public inputs, immutable once finalized
    pub commitment: [u8; 32],
    pub nullifier: [u8; 32],
    pub merkle_root: [u8; 32],

    /// PDA bump seed
    pub bump: u8,

    /// Raw transcript, zero-filled at creation
    pub data: Vec<u8>,

    /// Bit i set once byte i has been written
    pub coverage: Vec<u8>,
}

impl ProofBuffer {
    pub const SEED_PREFIX: &'static [u8] = b"proof_buffer";

    pub const HEADER_LEN: usize = 8 // discriminator
        + 32 // owner
        + 32 // pool
        + 4  // expected_size
        + 4  // size
        + 1  // finalized
        + 32 // commitment
        + 32 // nullifier
        + 32 // merkle_root
        + 1; // bump

    pub fn space(expected_size: u32) -> usize {
        let n = expected_size as usize;
        Self::HEADER_LEN
            + 4 + n                 // data (vec)
            + 4 + coverage_len(n)   // coverage (vec)
    }

    pub fn validate_size(expected_size: u32, limits: &BufferLimits) -> Result<()> {
        require!(
            expected_size > 0 && expected_size <= limits.max_proof_size,
            MurklError::InvalidSize
        );
        Ok(())
    }

    pub fn initialize(
        &mut self,
        owner: Pubkey,
        pool: Pubkey,
        expected_size: u32,
        bump: u8,
        limits: &BufferLimits,
    ) -> Result<()> {
        Self::validate_size(expected_size, limits)?;

        self.owner = owner;
        self.pool = pool;
        self.expected_size = expected_size;
        self.size = 0;
        self.finalized = false;
        self.commitment = [0u8; 32];
        self.nullifier = [0u8; 32];
        self.merkle_root = [0u8; 32];
        self.bump = bump;
        self.data = vec![0u8; expected_size as usize];
        self.coverage = vec![0u8; coverage_len(expected_size as usize)];
        Ok(())
    }

    pub fn state(&self) -> BufferState {
        if self.finalized {
            BufferState::Finalized
        } else {
            BufferState::Receiving
        }
    }

    pub fn require_owner(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(self.owner, *caller, MurklError::Unauthorized);
        Ok(())
    }

    pub fn require_not_finalized(&self) -> Result<()> {
        require!(!self.finalized, MurklError::AlreadyFinalized);
        Ok(())
    }

    pub fn require_finalized(&self) -> Result<()> {
        require!(self.finalized, MurklError::BufferNotFinalized);
        Ok(())
    }

    /// Write `chunk` at `offset` (overwrite semantics).
    pub fn upload_chunk(
        &mut self,
        caller: &Pubkey,
        offset: u32,
        chunk: &[u8],
        limits: &BufferLimits,
    ) -> Result<()> {
        self.require_owner(caller)?;
        self.require_not_finalized()?;
        require!(!chunk.is_empty(), MurklError::InvalidSize);
        require!(
            chunk.len() <= limits.max_chunk_size as usize,
            MurklError::ChunkTooLarge
        );
        let end = (offset as u64)
            .checked_add(chunk.len() as u64)
            .filter(|&end| end <= self.expected_size as u64)
            .ok_or(error!(MurklError::OutOfBounds))?;

        let start = offset as usize;
        let end = end as usize;
        self.data[start..end].copy_from_slice(chunk);
        for byte in start..end {
            self.coverage[byte / 8] |= 1 << (byte % 8);
        }
        self.size = self.size.max(end as u32);
        Ok(())
    }

    /// Every byte in `[0, expected_size)` has been written at least once.
    pub fn is_fully_covered(&self) -> bool {
        self.first_gap().is_none()
    }

    /// Offset of the first unwritten byte, if any.
    pub fn first_gap(&self) -> Option<u32> {
        (0..self.expected_size as usize)
            .find(|&i| self.coverage[i / 8] & (1 << (i % 8)) == 0)
            .map(|i| i as u32)
    }

    /// Decode and verify the transcript, then publish the public inputs.
    ///
    /// All-or-nothing: the buffer is untouched on every error path.
    pub fn finalize_and_verify<V: ProofVerifier + ?Sized>(
        &mut self,
        caller: &Pubkey,
        inputs: &PublicInputs,
        verifier: &V,
    ) -> Result<()> {
        self.require_owner(caller)?;
        self.require_not_finalized()?;
        require!(self.size == self.expected_size, MurklError::SizeMismatch);
        if let Some(gap) = self.first_gap() {
            msg!("Proof upload has a gap at offset {}", gap);
            return err!(MurklError::IncompleteUpload);
        }
        inputs.validate()?;

        let proof = StarkProof::decode(&self.data).map_err(|e| {
            msg!("Transcript decode failed: {}", e);
            error!(MurklError::MalformedProof)
        })?;

        verifier.verify(&proof, inputs).map_err(|e| {
            msg!("Proof rejected: {}", e);
            error!(MurklError::ConstraintViolation)
        })?;

        self.commitment = inputs.commitment;
        self.nullifier = inputs.nullifier;
        self.merkle_root = inputs.merkle_root;
        self.finalized = true;
        Ok(())
    }

    /// Verified public inputs, once finalized.
    pub fn public_inputs(&self) -> Option<PublicInputs> {
        self.finalized
            .then(|| PublicInputs::new(self.commitment, self.nullifier, self.merkle_root))
    }

    /// Owner may reclaim the buffer in any state.
    pub fn authorize_close(&self, caller: &Pubkey) -> Result<()> {
        self.require_owner(caller)
    }
}

fn coverage_len(expected_size: usize) -> usize {
    (expected_size + 7) / 8
}
