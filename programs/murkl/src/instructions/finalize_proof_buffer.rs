//! Finalize Proof Buffer Instruction
//!
//! Decodes the uploaded transcript, verifies it against the supplied public
//! inputs and freezes the buffer. Built with `dev-mode`, the permissive
//! verifier is used instead; such builds must never be deployed.

use anchor_lang::prelude::*;

use crate::crypto::verifier::PublicInputs;
use crate::events::BufferFinalized;
use crate::state::ProofBuffer;

#[cfg(feature = "dev-mode")]
use crate::crypto::verifier::AcceptAllVerifier;
#[cfg(not(feature = "dev-mode"))]
use crate::crypto::verifier::StarkVerifier;

/// Accounts for finalize_proof_buffer instruction.
#[derive(Accounts)]
pub struct FinalizeProofBuffer<'info> {
    /// Ownership is checked in `finalize_and_verify` so the error order holds.
    #[account(mut)]
    pub proof_buffer: Box<Account<'info, ProofBuffer>>,

    /// Buffer owner (must sign).
    pub owner: Signer<'info>,
}

/// Handler for finalize_proof_buffer instruction.
pub fn handler(
    ctx: Context<FinalizeProofBuffer>,
    commitment: [u8; 32],
    nullifier: [u8; 32],
    merkle_root: [u8; 32],
) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let inputs = PublicInputs::new(commitment, nullifier, merkle_root);
    let buffer = &mut ctx.accounts.proof_buffer;

    #[cfg(feature = "dev-mode")]
    {
        msg!("WARNING: dev-mode verifier accepts any transcript");
        buffer.finalize_and_verify(&owner, &inputs, &AcceptAllVerifier)?;
    }
    #[cfg(not(feature = "dev-mode"))]
    buffer.finalize_and_verify(&owner, &inputs, &StarkVerifier::default())?;

    emit!(BufferFinalized {
        buffer: buffer.key(),
        owner,
        commitment,
        nullifier,
        merkle_root,
    });

    msg!("Proof verified");
    msg!("Nullifier: {:?}", &nullifier[..8]);
    Ok(())
}
