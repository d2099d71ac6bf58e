//! Create Proof Buffer Instruction
//!
//! Allocates a zero-filled buffer sized for one transcript. `buffer_id` lets
//! a relayer keep several uploads in flight.

use anchor_lang::prelude::*;

use crate::events::BufferCreated;
use crate::state::{Pool, ProofBuffer};

/// Accounts for create_proof_buffer instruction.
#[derive(Accounts)]
#[instruction(buffer_id: u64, expected_size: u32)]
pub struct CreateProofBuffer<'info> {
    /// Pool the proof will be claimed against; supplies the size limits.
    pub pool: Box<Account<'info, Pool>>,

    /// Space is clamped to the pool limit; `initialize` rejects oversized requests.
    #[account(
        init,
        payer = owner,
        space = ProofBuffer::space(expected_size.min(pool.buffer_limits.max_proof_size)),
        seeds = [
            ProofBuffer::SEED_PREFIX,
            owner.key().as_ref(),
            buffer_id.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub proof_buffer: Box<Account<'info, ProofBuffer>>,

    /// Relayer paying rent (must sign).
    #[account(mut)]
    pub owner: Signer<'info>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Handler for create_proof_buffer instruction.
pub fn handler(ctx: Context<CreateProofBuffer>, _buffer_id: u64, expected_size: u32) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let pool_key = ctx.accounts.pool.key();
    let limits = ctx.accounts.pool.buffer_limits();
    let buffer = &mut ctx.accounts.proof_buffer;
    buffer.initialize(owner, pool_key, expected_size, ctx.bumps.proof_buffer, &limits)?;

    emit!(BufferCreated {
        buffer: buffer.key(),
        owner,
        expected_size,
    });

    msg!("Proof buffer created ({} bytes)", expected_size);
    Ok(())
}
