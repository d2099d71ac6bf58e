//! Upload Chunk Instruction

use anchor_lang::prelude::*;

use crate::error::MurklError;
use crate::state::{Pool, ProofBuffer};

/// Accounts for upload_chunk instruction.
#[derive(Accounts)]
pub struct UploadChunk<'info> {
    /// Pool the buffer was created under.
    pub pool: Box<Account<'info, Pool>>,

    /// Buffer being written.
    #[account(
        mut,
        has_one = owner @ MurklError::Unauthorized,
        has_one = pool @ MurklError::Unauthorized,
    )]
    pub proof_buffer: Box<Account<'info, ProofBuffer>>,

    /// Buffer owner (must sign).
    pub owner: Signer<'info>,
}

/// Handler for upload_chunk instruction.
pub fn handler(ctx: Context<UploadChunk>, offset: u32, data: Vec<u8>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let limits = ctx.accounts.pool.buffer_limits();
    let buffer = &mut ctx.accounts.proof_buffer;
    buffer.upload_chunk(&owner, offset, &data, &limits)?;

    msg!(
        "Chunk written at {} ({} bytes, {}/{})",
        offset,
        data.len(),
        buffer.size,
        buffer.expected_size
    );
    Ok(())
}
