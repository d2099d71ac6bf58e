//! Claim Instruction
//!
//! Pays out a deposit against a finalized proof buffer.
//!
//! # Flow
//! 1. The relayer owns the buffer and signs the claim
//! 2. The buffer's proven commitment must equal the deposit's commitment
//! 3. The proven root must be one the tree held once the deposit was in it
//! 4. The nullifier record is created on first use and consumed here
//! 5. `amount - fee` goes to the recipient, `fee` to the relayer
//!
//! All checks run before any account is mutated; the transaction is atomic,
//! so a failed transfer rolls back the nullifier and claimed flag with it.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::error::MurklError;
use crate::events::ClaimEvent;
use crate::state::{DepositRecord, MerkleTree, NullifierRecord, Pool, ProofBuffer};

/// Accounts for claim instruction.
#[derive(Accounts)]
#[instruction(leaf_index: u64, fee_bps: u16)]
pub struct Claim<'info> {
    /// Pool paying out the deposit.
    #[account(
        mut,
        seeds = [Pool::SEED_PREFIX, pool.token_mint.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// Commitment tree, for root history lookups.
    #[account(
        seeds = [MerkleTree::SEED_PREFIX, pool.key().as_ref()],
        bump,
        constraint = merkle_tree.pool == pool.key() @ MurklError::Unauthorized,
    )]
    pub merkle_tree: Box<Account<'info, MerkleTree>>,

    /// Finalized buffer holding the verified public inputs.
    #[account(has_one = pool @ MurklError::Unauthorized)]
    pub proof_buffer: Box<Account<'info, ProofBuffer>>,

    /// Deposit being claimed, addressed by leaf index.
    #[account(
        mut,
        seeds = [
            DepositRecord::SEED_PREFIX,
            pool.key().as_ref(),
            leaf_index.to_le_bytes().as_ref(),
        ],
        bump = deposit_record.bump,
    )]
    pub deposit_record: Box<Account<'info, DepositRecord>>,

    /// Created on first use of the nullifier. An existing consumed record
    /// fails the claim with `NullifierAlreadyUsed`.
    #[account(
        init_if_needed,
        payer = relayer,
        space = NullifierRecord::LEN,
        seeds = [
            NullifierRecord::SEED_PREFIX,
            pool.key().as_ref(),
            proof_buffer.nullifier.as_ref(),
        ],
        bump
    )]
    pub nullifier_record: Box<Account<'info, NullifierRecord>>,

    /// Pool token vault (source of both transfers).
    #[account(
        mut,
        seeds = [b"vault", pool.key().as_ref()],
        bump,
        constraint = vault.mint == pool.token_mint @ MurklError::InvalidMint,
        constraint = vault.owner == pool.key() @ MurklError::Unauthorized,
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Receives `amount - fee`.
    #[account(
        mut,
        constraint = recipient_token_account.mint == pool.token_mint @ MurklError::InvalidMint,
    )]
    pub recipient_token_account: Box<Account<'info, TokenAccount>>,

    /// Receives the relayer fee.
    #[account(
        mut,
        constraint = relayer_token_account.mint == pool.token_mint @ MurklError::InvalidMint,
    )]
    pub relayer_token_account: Box<Account<'info, TokenAccount>>,

    /// Owner of the proof buffer; pays for the nullifier record.
    #[account(mut)]
    pub relayer: Signer<'info>,

    /// Token program
    pub token_program: Program<'info, Token>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// How a claimed deposit is split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimPayout {
    pub amount: u64,
    pub recipient_amount: u64,
    pub relayer_fee: u64,
}

/// Every precondition of a claim, in a fixed order. Mutates nothing.
#[allow(clippy::too_many_arguments)]
pub fn authorize_claim(
    pool: &Pool,
    merkle_tree: &MerkleTree,
    proof_buffer: &ProofBuffer,
    relayer: &Pubkey,
    deposit: &DepositRecord,
    nullifier_record: &NullifierRecord,
    vault_balance: u64,
    fee_bps: u16,
) -> Result<ClaimPayout> {
    pool.require_not_paused()?;
    proof_buffer.require_owner(relayer)?;
    proof_buffer.require_finalized()?;

    require!(
        proof_buffer.commitment == deposit.commitment,
        MurklError::CommitmentMismatch
    );
    deposit.require_unclaimed()?;
    require!(
        merkle_tree.is_root_valid_for_leaf(&proof_buffer.merkle_root, deposit.leaf_index),
        MurklError::StaleMerkleRoot
    );

    let relayer_fee = pool.relayer_fee(deposit.amount, fee_bps)?;
    require!(
        vault_balance >= deposit.amount,
        MurklError::InsufficientBalance
    );
    nullifier_record.require_unused()?;

    let recipient_amount = deposit
        .amount
        .checked_sub(relayer_fee)
        .ok_or(error!(MurklError::ArithmeticOverflow))?;

    Ok(ClaimPayout {
        amount: deposit.amount,
        recipient_amount,
        relayer_fee,
    })
}

/// Spend the nullifier and mark the deposit claimed.
#[allow(clippy::too_many_arguments)]
pub fn apply_claim(
    pool: &mut Pool,
    pool_key: Pubkey,
    deposit: &mut DepositRecord,
    nullifier_record: &mut NullifierRecord,
    nullifier: [u8; 32],
    spent_at: i64,
    spent_slot: u64,
    bump: u8,
) -> Result<()> {
    nullifier_record.consume(pool_key, nullifier, spent_at, spent_slot, bump)?;
    deposit.mark_claimed()?;
    pool.increment_claims()
}

/// Handler for claim instruction.
pub fn handler(ctx: Context<Claim>, leaf_index: u64, fee_bps: u16) -> Result<()> {
    let relayer = ctx.accounts.relayer.key();
    let payout = authorize_claim(
        &ctx.accounts.pool,
        &ctx.accounts.merkle_tree,
        &ctx.accounts.proof_buffer,
        &relayer,
        &ctx.accounts.deposit_record,
        &ctx.accounts.nullifier_record,
        ctx.accounts.vault.amount,
        fee_bps,
    )?;

    // ========== STATE UPDATES ==========

    let clock = Clock::get()?;
    let pool_key = ctx.accounts.pool.key();
    let nullifier = ctx.accounts.proof_buffer.nullifier;
    apply_claim(
        &mut ctx.accounts.pool,
        pool_key,
        &mut ctx.accounts.deposit_record,
        &mut ctx.accounts.nullifier_record,
        nullifier,
        clock.unix_timestamp,
        clock.slot,
        ctx.bumps.nullifier_record,
    )?;

    // ========== TOKEN TRANSFERS ==========

    let token_mint = ctx.accounts.pool.token_mint;
    let bump = [ctx.accounts.pool.bump];
    let pool_seeds: &[&[u8]] = &[Pool::SEED_PREFIX, token_mint.as_ref(), &bump];
    let signer_seeds = &[pool_seeds];

    if payout.recipient_amount > 0 {
        let cpi_accounts = Transfer {
            from: ctx.accounts.vault.to_account_info(),
            to: ctx.accounts.recipient_token_account.to_account_info(),
            authority: ctx.accounts.pool.to_account_info(),
        };
        let cpi_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            cpi_accounts,
            signer_seeds,
        );
        token::transfer(cpi_ctx, payout.recipient_amount)?;
    }

    if payout.relayer_fee > 0 {
        let cpi_accounts = Transfer {
            from: ctx.accounts.vault.to_account_info(),
            to: ctx.accounts.relayer_token_account.to_account_info(),
            authority: ctx.accounts.pool.to_account_info(),
        };
        let cpi_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            cpi_accounts,
            signer_seeds,
        );
        token::transfer(cpi_ctx, payout.relayer_fee)?;
    }

    emit!(ClaimEvent {
        pool: pool_key,
        nullifier,
        leaf_index,
        recipient: ctx.accounts.recipient_token_account.key(),
        amount: payout.amount,
        relayer,
        relayer_fee: payout.relayer_fee,
        timestamp: clock.unix_timestamp,
    });

    msg!("Claim successful");
    msg!("Amount: {} (fee {})", payout.amount, payout.relayer_fee);
    msg!("Nullifier: {:?}", &nullifier[..8]);

    Ok(())
}
