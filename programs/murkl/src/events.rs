//! Events for the Murkl program
//!
//! Commitments and nullifiers are emitted in full here; free-text `msg!` logs
//! only carry short prefixes.

use anchor_lang::prelude::*;

#[event]
pub struct PoolInitialized {
    pub pool: Pubkey,
    pub admin: Pubkey,
    pub token_mint: Pubkey,
    pub tree_depth: u8,
    pub root_history_size: u16,
    pub min_deposit: u64,
    pub max_relayer_fee_bps: u16,
    pub max_proof_size: u32,
    pub max_chunk_size: u32,
    pub timestamp: i64,
}

#[event]
pub struct DepositEvent {
    pub pool: Pubkey,
    pub commitment: [u8; 32],
    pub leaf_index: u64,
    pub merkle_root: [u8; 32],
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct BufferCreated {
    pub buffer: Pubkey,
    pub owner: Pubkey,
    pub expected_size: u32,
}

#[event]
pub struct BufferFinalized {
    pub buffer: Pubkey,
    pub owner: Pubkey,
    pub commitment: [u8; 32],
    pub nullifier: [u8; 32],
    pub merkle_root: [u8; 32],
}

#[event]
pub struct BufferClosed {
    pub buffer: Pubkey,
    pub owner: Pubkey,
    pub finalized: bool,
}

#[event]
pub struct ClaimEvent {
    pub pool: Pubkey,
    pub nullifier: [u8; 32],
    pub leaf_index: u64,
    pub recipient: Pubkey,
    pub amount: u64,
    pub relayer: Pubkey,
    pub relayer_fee: u64,
    pub timestamp: i64,
}

#[event]
pub struct PoolPaused {
    pub pool: Pubkey,
    pub admin: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct PoolUnpaused {
    pub pool: Pubkey,
    pub admin: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct AuthorityUpdated {
    pub pool: Pubkey,
    pub old_admin: Pubkey,
    pub new_admin: Pubkey,
    pub timestamp: i64,
}
