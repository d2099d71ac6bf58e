//! Update Authority Instruction
//!
//! Hands admin rights to a new key in one step.

use anchor_lang::prelude::*;

use crate::error::MurklError;
use crate::events::AuthorityUpdated;
use crate::state::Pool;

/// Accounts for update_authority instruction.
#[derive(Accounts)]
pub struct UpdateAuthority<'info> {
    /// Pool whose admin changes.
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

/// Handler for update_authority instruction.
pub fn handler(ctx: Context<UpdateAuthority>, new_admin: Pubkey) -> Result<()> {
    require_keys_neq!(new_admin, Pubkey::default(), MurklError::Unauthorized);

    let pool = &mut ctx.accounts.pool;
    let old_admin = ctx.accounts.admin.key();
    pool.require_admin(&old_admin)?;
    pool.transfer_admin(new_admin);

    emit!(AuthorityUpdated {
        pool: pool.key(),
        old_admin,
        new_admin,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Admin updated to: {}", new_admin);
    Ok(())
}
