//! Deposit record account
//!
//! One account per deposit, addressed by leaf index. Storage layout is part
//! of the client contract and must not change without a version bump:
//!
//! ```text
//! offset  size  field
//!      0     8  discriminator
//!      8    32  pool
//!     40    32  commitment
//!     72     8  amount      (u64 LE)
//!     80     8  leaf_index  (u64 LE)
//!     88     1  claimed
//!     89     1  bump
//! ```

use anchor_lang::prelude::*;

use crate::error::MurklError;

/// PDA Seeds: `[b"deposit", pool.key().as_ref(), leaf_index.to_le_bytes()]`
#[account]
#[derive(Default, Debug)]
pub struct DepositRecord {
    pub pool: Pubkey,
    pub commitment: [u8; 32],
    /// Never mutated after creation
    pub amount: u64,
    pub leaf_index: u64,
    /// false -> true exactly once
    pub claimed: bool,
    pub bump: u8,
}

impl DepositRecord {
    pub const SEED_PREFIX: &'static [u8] = b"deposit";

    pub const LEN: usize = 8 // discriminator
        + 32 // pool
        + 32 // commitment
        + 8  // amount
        + 8  // leaf_index
        + 1  // claimed
        + 1; // bump

    pub const COMMITMENT_OFFSET: usize = 40;
    pub const AMOUNT_OFFSET: usize = 72;
    pub const LEAF_INDEX_OFFSET: usize = 80;
    pub const CLAIMED_OFFSET: usize = 88;

    pub fn initialize(
        &mut self,
        pool: Pubkey,
        commitment: [u8; 32],
        amount: u64,
        leaf_index: u64,
        bump: u8,
    ) {
        self.pool = pool;
        self.commitment = commitment;
        self.amount = amount;
        self.leaf_index = leaf_index;
        self.claimed = false;
        self.bump = bump;
    }

    pub fn require_unclaimed(&self) -> Result<()> {
        require!(!self.claimed, MurklError::AlreadyClaimed);
        Ok(())
    }

    /// Irreversible claimed transition.
    pub fn mark_claimed(&mut self) -> Result<()> {
        self.require_unclaimed()?;
        self.claimed = true;
        Ok(())
    }
}
