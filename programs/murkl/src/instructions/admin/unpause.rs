//! Unpause Pool Instruction

use anchor_lang::prelude::*;

use crate::error::MurklError;
use crate::events::PoolUnpaused;
use crate::state::Pool;

/// Accounts for unpause_pool instruction.
#[derive(Accounts)]
pub struct UnpausePool<'info> {
    /// Pool to resume.
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

/// Handler for unpause_pool instruction.
pub fn handler(ctx: Context<UnpausePool>) -> Result<()> {
    let pool = &mut ctx.accounts.pool;
    pool.set_paused(false);

    emit!(PoolUnpaused {
        pool: pool.key(),
        admin: ctx.accounts.admin.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Pool unpaused by admin");
    Ok(())
}
