//! Pause Pool Instruction
//!
//! Emergency stop: blocks deposits and claims. Buffer uploads are unaffected.

use anchor_lang::prelude::*;

use crate::error::MurklError;
use crate::events::PoolPaused;
use crate::state::Pool;

/// Accounts for pause_pool instruction.
#[derive(Accounts)]
pub struct PausePool<'info> {
    /// Pool to pause.
    #[account(
        mut,
        seeds = [Pool::SEED_PREFIX, pool.token_mint.as_ref()],
        bump = pool.bump,
        has_one = admin @ MurklError::Unauthorized,
    )]
    pub pool: Account<'info, Pool>,

    /// Pool admin (must sign).
    pub admin: Signer<'info>,
}

/// Handler for pause_pool instruction.
pub fn handler(ctx: Context<PausePool>) -> Result<()> {
    let pool = &mut ctx.accounts.pool;
    pool.set_paused(true);

    emit!(PoolPaused {
        pool: pool.key(),
        admin: ctx.accounts.admin.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Pool paused by admin");
    Ok(())
}
