//! Nullifier record using the per-nullifier PDA pattern
//!
//! Each spent nullifier gets its own account, so "is it spent" is an O(1)
//! account lookup and capacity is unbounded.
//!
//! # Anti-Double-Spend Mechanism
//! 1. Claim derives the PDA from `(pool, nullifier)`
//! 2. Account is created on first use (`init_if_needed`)
//! 3. An already-consumed record rejects the claim
//! 4. Otherwise the record is consumed in the same transaction as the payout
//!
//! Solana transactions are atomic, so check and insert cannot be split by a
//! concurrent claim: two transactions writing the same PDA are serialized by
//! the runtime and the second sees the consumed record.

use anchor_lang::prelude::*;

use crate::error::MurklError;

/// PDA Seeds: `[b"nullifier", pool.key().as_ref(), nullifier.as_ref()]`
#[account]
#[derive(Default, Debug)]
pub struct NullifierRecord {
    /// Parent pool; `Pubkey::default()` until consumed
    pub pool: Pubkey,

    /// The spent nullifier
    pub nullifier: [u8; 32],

    /// Unix timestamp when the nullifier was spent
    pub spent_at: i64,

    /// Slot when the nullifier was spent (for indexing)
    pub spent_slot: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl NullifierRecord {
    pub const SEED_PREFIX: &'static [u8] = b"nullifier";

    /// Account space (minimal to reduce rent costs)
    pub const LEN: usize = 8  // discriminator
        + 32                  // pool
        + 32                  // nullifier
        + 8                   // spent_at
        + 8                   // spent_slot
        + 1;                  // bump

    pub fn is_consumed(&self) -> bool {
        self.pool != Pubkey::default()
    }

    pub fn require_unused(&self) -> Result<()> {
        require!(!self.is_consumed(), MurklError::NullifierAlreadyUsed);
        Ok(())
    }

    /// Check-and-set. Fails without mutating if already consumed.
    pub fn consume(
        &mut self,
        pool: Pubkey,
        nullifier: [u8; 32],
        spent_at: i64,
        spent_slot: u64,
        bump: u8,
    ) -> Result<()> {
        self.require_unused()?;
        self.pool = pool;
        self.nullifier = nullifier;
        self.spent_at = spent_at;
        self.spent_slot = spent_slot;
        self.bump = bump;
        Ok(())
    }

    /// Derive the PDA address for a nullifier
    pub fn find_pda(program_id: &Pubkey, pool: &Pubkey, nullifier: &[u8; 32]) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[Self::SEED_PREFIX, pool.as_ref(), nullifier.as_ref()],
            program_id,
        )
    }
}
