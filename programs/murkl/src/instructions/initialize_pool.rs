//! Initialize Pool Instruction

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::config::BufferLimits;
use crate::events::PoolInitialized;
use crate::state::{MerkleTree, Pool};

/// Accounts for initialize_pool instruction.
#[derive(Accounts)]
#[instruction(tree_depth: u8, root_history_size: u16)]
pub struct InitializePool<'info> {
    /// Pool account (PDA per mint).
    #[account(
        init,
        payer = admin,
        space = Pool::LEN,
        seeds = [Pool::SEED_PREFIX, token_mint.key().as_ref()],
        bump
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// Commitment tree, sized from depth and root history.
    #[account(
        init,
        payer = admin,
        space = MerkleTree::space(tree_depth, root_history_size),
        seeds = [MerkleTree::SEED_PREFIX, pool.key().as_ref()],
        bump
    )]
    pub merkle_tree: Box<Account<'info, MerkleTree>>,

    /// Token vault owned by the pool PDA.
    #[account(
        init,
        payer = admin,
        token::mint = token_mint,
        token::authority = pool,
        seeds = [b"vault", pool.key().as_ref()],
        bump
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Mint of the pooled token.
    pub token_mint: Box<Account<'info, Mint>>,

    /// Pool admin (must sign, pays rent).
    #[account(mut)]
    pub admin: Signer<'info>,

    /// System program
    pub system_program: Program<'info, System>,

    /// Token program
    pub token_program: Program<'info, Token>,
}

/// Handler for initialize_pool instruction.
pub fn handler(
    ctx: Context<InitializePool>,
    tree_depth: u8,
    root_history_size: u16,
    min_deposit: u64,
    max_relayer_fee_bps: u16,
    buffer_limits: BufferLimits,
) -> Result<()> {
    MerkleTree::validate_params(tree_depth, root_history_size)?;

    let pool_key = ctx.accounts.pool.key();
    let merkle_tree = &mut ctx.accounts.merkle_tree;
    merkle_tree.initialize(pool_key, tree_depth, root_history_size)?;

    let pool = &mut ctx.accounts.pool;
    pool.initialize(
        ctx.accounts.admin.key(),
        ctx.accounts.token_mint.key(),
        ctx.accounts.vault.key(),
        merkle_tree.key(),
        tree_depth,
        min_deposit,
        max_relayer_fee_bps,
        buffer_limits,
        ctx.bumps.pool,
    )?;
    pool.sync_tree(merkle_tree.current_root, merkle_tree.leaf_count);

    emit!(PoolInitialized {
        pool: pool_key,
        admin: ctx.accounts.admin.key(),
        token_mint: ctx.accounts.token_mint.key(),
        tree_depth,
        root_history_size,
        min_deposit,
        max_relayer_fee_bps,
        max_proof_size: buffer_limits.max_proof_size,
        max_chunk_size: buffer_limits.max_chunk_size,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Murkl pool initialized (depth {})", tree_depth);
    Ok(())
}
