//! Pool state account
//!
//! Stores the admin, token plumbing, deposit/fee policy and a mirror of the
//! commitment tree's current root and leaf count.

use anchor_lang::prelude::*;

use crate::config::BufferLimits;
use crate::error::MurklError;

/// Basis-point denominator for relayer fees.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Main pool account.
///
/// PDA Seeds: `[b"pool", token_mint.key().as_ref()]`
#[account]
#[derive(Default, Debug)]
pub struct Pool {
    /// Pool admin - can pause and transfer admin rights
    pub admin: Pubkey,

    /// SPL token mint for deposits/claims
    pub token_mint: Pubkey,

    /// Token vault PDA address (cached for convenience)
    pub vault: Pubkey,

    /// Merkle tree account address (cached for convenience)
    pub merkle_tree: Pubkey,

    /// Current commitment tree root (mirrors the tree account)
    pub merkle_root: [u8; 32],

    /// Number of deposits inserted; next deposit gets this leaf index
    pub leaf_count: u64,

    /// Smallest accepted deposit
    pub min_deposit: u64,

    /// Upper bound on the relayer fee a claim may request
    pub max_relayer_fee_bps: u16,

    /// Merkle tree depth (immutable after init)
    pub tree_depth: u8,

    /// Proof buffer and chunk size limits for this pool
    pub buffer_limits: BufferLimits,

    /// Total number of successful claims
    pub total_claims: u64,

    /// Pool paused flag - blocks deposits and claims when true
    pub paused: bool,

    /// PDA bump seed
    pub bump: u8,
}

impl Pool {
    pub const SEED_PREFIX: &'static [u8] = b"pool";

    /// Account space calculation
    pub const LEN: usize = 8 // discriminator
        + 32 // admin
        + 32 // token_mint
        + 32 // vault
        + 32 // merkle_tree
        + 32 // merkle_root
        + 8  // leaf_count
        + 8  // min_deposit
        + 2  // max_relayer_fee_bps
        + 1  // tree_depth
        + BufferLimits::LEN // buffer_limits
        + 8  // total_claims
        + 1  // paused
        + 1; // bump

    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        &mut self,
        admin: Pubkey,
        token_mint: Pubkey,
        vault: Pubkey,
        merkle_tree: Pubkey,
        tree_depth: u8,
        min_deposit: u64,
        max_relayer_fee_bps: u16,
        buffer_limits: BufferLimits,
        bump: u8,
    ) -> Result<()> {
        require!(
            max_relayer_fee_bps as u64 <= BPS_DENOMINATOR,
            MurklError::InvalidFeeConfig
        );
        buffer_limits.validate()?;

        self.admin = admin;
        self.token_mint = token_mint;
        self.vault = vault;
        self.merkle_tree = merkle_tree;
        self.merkle_root = [0u8; 32];
        self.leaf_count = 0;
        self.min_deposit = min_deposit;
        self.max_relayer_fee_bps = max_relayer_fee_bps;
        self.tree_depth = tree_depth;
        self.buffer_limits = buffer_limits;
        self.total_claims = 0;
        self.paused = false;
        self.bump = bump;
        Ok(())
    }

    pub fn buffer_limits(&self) -> BufferLimits {
        self.buffer_limits
    }

    /// Check if pool is not paused
    pub fn require_not_paused(&self) -> Result<()> {
        require!(!self.paused, MurklError::PoolPaused);
        Ok(())
    }

    pub fn require_admin(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(self.admin, *caller, MurklError::Unauthorized);
        Ok(())
    }

    /// Deposits below `min_deposit` (and zero) are rejected.
    pub fn require_valid_deposit(&self, amount: u64) -> Result<()> {
        require!(
            amount > 0 && amount >= self.min_deposit,
            MurklError::InvalidAmount
        );
        Ok(())
    }

    /// Copy the tree's root and leaf count after an insertion.
    pub fn sync_tree(&mut self, merkle_root: [u8; 32], leaf_count: u64) {
        self.merkle_root = merkle_root;
        self.leaf_count = leaf_count;
    }

    /// Relayer fee in tokens for `amount`, floor-rounded.
    pub fn relayer_fee(&self, amount: u64, fee_bps: u16) -> Result<u64> {
        require!(
            fee_bps <= self.max_relayer_fee_bps,
            MurklError::FeeExceedsMax
        );
        let fee = (amount as u128)
            .checked_mul(fee_bps as u128)
            .ok_or(error!(MurklError::ArithmeticOverflow))?
            / BPS_DENOMINATOR as u128;
        u64::try_from(fee).map_err(|_| error!(MurklError::ArithmeticOverflow))
    }

    /// Increment claim counter (checked arithmetic)
    pub fn increment_claims(&mut self) -> Result<()> {
        self.total_claims = self
            .total_claims
            .checked_add(1)
            .ok_or(error!(MurklError::ArithmeticOverflow))?;
        Ok(())
    }

    /// Set pause state
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Transfer admin rights to a new address
    pub fn transfer_admin(&mut self, new_admin: Pubkey) {
        self.admin = new_admin;
    }
}
