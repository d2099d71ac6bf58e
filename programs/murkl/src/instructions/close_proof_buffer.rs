//! Close Proof Buffer Instruction
//!
//! Returns the buffer's rent to its owner. Allowed in any state; a finalized
//! buffer that is closed before claiming simply has to be re-uploaded.

use anchor_lang::prelude::*;

use crate::events::BufferClosed;
use crate::state::ProofBuffer;

/// Accounts for close_proof_buffer instruction.
#[derive(Accounts)]
pub struct CloseProofBuffer<'info> {
    /// Buffer to close; rent goes back to `owner`.
    #[account(mut, close = owner)]
    pub proof_buffer: Box<Account<'info, ProofBuffer>>,

    /// Buffer owner (must sign).
    #[account(mut)]
    pub owner: Signer<'info>,
}

/// Handler for close_proof_buffer instruction.
pub fn handler(ctx: Context<CloseProofBuffer>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let buffer = &ctx.accounts.proof_buffer;
    buffer.authorize_close(&owner)?;

    emit!(BufferClosed {
        buffer: buffer.key(),
        owner,
        finalized: buffer.finalized,
    });

    msg!("Proof buffer closed");
    Ok(())
}
