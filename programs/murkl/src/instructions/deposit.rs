//! Deposit Instruction
//!
//! Moves SPL tokens into the pool vault, records the deposit and appends its
//! commitment to the Merkle tree.
//!
//! The commitment is computed off-chain from the recipient identifier and a
//! password (see `crypto::hash::compute_commitment`); the program never sees
//! either.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::crypto::hash::is_zero_hash;
use crate::error::MurklError;
use crate::events::DepositEvent;
use crate::state::{DepositRecord, MerkleTree, Pool};

/// Accounts for deposit instruction.
#[derive(Accounts)]
#[instruction(amount: u64, commitment: [u8; 32])]
pub struct Deposit<'info> {
    /// Pool receiving the deposit.
    #[account(
        mut,
        seeds = [Pool::SEED_PREFIX, pool.token_mint.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// Commitment tree; the new leaf is appended here.
    #[account(
        mut,
        seeds = [MerkleTree::SEED_PREFIX, pool.key().as_ref()],
        bump,
        constraint = merkle_tree.pool == pool.key() @ MurklError::Unauthorized,
    )]
    pub merkle_tree: Box<Account<'info, MerkleTree>>,

    /// Addressed by the leaf index this deposit will occupy.
    #[account(
        init,
        payer = depositor,
        space = DepositRecord::LEN,
        seeds = [
            DepositRecord::SEED_PREFIX,
            pool.key().as_ref(),
            merkle_tree.leaf_count.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub deposit_record: Box<Account<'info, DepositRecord>>,

    /// Pool token vault.
    #[account(
        mut,
        seeds = [b"vault", pool.key().as_ref()],
        bump,
        constraint = vault.mint == pool.token_mint @ MurklError::InvalidMint,
        constraint = vault.owner == pool.key() @ MurklError::Unauthorized,
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Source of the deposited tokens.
    #[account(
        mut,
        constraint = depositor_token_account.mint == pool.token_mint @ MurklError::InvalidMint,
    )]
    pub depositor_token_account: Box<Account<'info, TokenAccount>>,

    /// Depositor (must sign, pays for the deposit record).
    #[account(mut)]
    pub depositor: Signer<'info>,

    /// System program
    pub system_program: Program<'info, System>,

    /// Token program
    pub token_program: Program<'info, Token>,
}

/// Validation shared by the handler and tests. Returns the leaf index the
/// deposit will occupy.
pub fn validate_deposit(
    pool: &Pool,
    merkle_tree: &MerkleTree,
    amount: u64,
    commitment: &[u8; 32],
) -> Result<u64> {
    pool.require_not_paused()?;
    pool.require_valid_deposit(amount)?;
    require!(!is_zero_hash(commitment), MurklError::InvalidCommitment);
    require!(!merkle_tree.is_full(), MurklError::MerkleTreeFull);
    Ok(merkle_tree.leaf_count)
}

/// Record the deposit, insert its leaf and mirror the tree into the pool.
pub fn apply_deposit(
    pool: &mut Pool,
    pool_key: Pubkey,
    merkle_tree: &mut MerkleTree,
    record: &mut DepositRecord,
    amount: u64,
    commitment: [u8; 32],
    bump: u8,
) -> Result<u64> {
    let leaf_index = merkle_tree.insert_leaf(commitment)?;
    record.initialize(pool_key, commitment, amount, leaf_index, bump);
    pool.sync_tree(merkle_tree.current_root, merkle_tree.leaf_count);
    Ok(leaf_index)
}

/// Handler for deposit instruction.
pub fn handler(ctx: Context<Deposit>, amount: u64, commitment: [u8; 32]) -> Result<()> {
    validate_deposit(&ctx.accounts.pool, &ctx.accounts.merkle_tree, amount, &commitment)?;

    let cpi_accounts = Transfer {
        from: ctx.accounts.depositor_token_account.to_account_info(),
        to: ctx.accounts.vault.to_account_info(),
        authority: ctx.accounts.depositor.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    token::transfer(cpi_ctx, amount)?;

    let pool_key = ctx.accounts.pool.key();
    let leaf_index = apply_deposit(
        &mut ctx.accounts.pool,
        pool_key,
        &mut ctx.accounts.merkle_tree,
        &mut ctx.accounts.deposit_record,
        amount,
        commitment,
        ctx.bumps.deposit_record,
    )?;

    emit!(DepositEvent {
        pool: pool_key,
        commitment,
        leaf_index,
        merkle_root: ctx.accounts.merkle_tree.current_root,
        amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Deposit successful");
    msg!("Amount: {}", amount);
    msg!("Leaf index: {}", leaf_index);
    msg!("Commitment: {:?}", &commitment[..8]);

    Ok(())
}
