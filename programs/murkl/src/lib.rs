//! Murkl - shielded pool with chunk-uploaded STARK claim proofs
//!
//! A depositor locks tokens against a commitment derived from a recipient
//! identifier and a password. The recipient's relayer later streams a STARK
//! proof into a proof buffer, finalizes it against `(commitment, nullifier,
//! merkle_root)`, and claims the deposit to any token account.

use anchor_lang::prelude::*;

pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod instructions;
#[cfg(not(target_os = "solana"))]
pub mod relayer;
pub mod state;

#[cfg(test)]
mod tests;

#[cfg(test)]
pub(crate) mod test_utils;

use config::BufferLimits;
use instructions::*;

declare_id!("28cK3JA6TNvwd4PQBL9DtaE5tCtCpR3RfeM8WfnvudxL");

#[program]
pub mod murkl {
    use super::*;

    pub fn initialize_pool(
        ctx: Context<InitializePool>,
        tree_depth: u8,
        root_history_size: u16,
        min_deposit: u64,
        max_relayer_fee_bps: u16,
        buffer_limits: BufferLimits,
    ) -> Result<()> {
        instructions::initialize_pool::handler(
            ctx,
            tree_depth,
            root_history_size,
            min_deposit,
            max_relayer_fee_bps,
            buffer_limits,
        )
    }

    pub fn deposit(ctx: Context<Deposit>, amount: u64, commitment: [u8; 32]) -> Result<()> {
        instructions::deposit::handler(ctx, amount, commitment)
    }

    pub fn create_proof_buffer(
        ctx: Context<CreateProofBuffer>,
        buffer_id: u64,
        expected_size: u32,
    ) -> Result<()> {
        instructions::create_proof_buffer::handler(ctx, buffer_id, expected_size)
    }

    pub fn upload_chunk(ctx: Context<UploadChunk>, offset: u32, data: Vec<u8>) -> Result<()> {
        instructions::upload_chunk::handler(ctx, offset, data)
    }

    pub fn finalize_proof_buffer(
        ctx: Context<FinalizeProofBuffer>,
        commitment: [u8; 32],
        nullifier: [u8; 32],
        merkle_root: [u8; 32],
    ) -> Result<()> {
        instructions::finalize_proof_buffer::handler(ctx, commitment, nullifier, merkle_root)
    }

    pub fn close_proof_buffer(ctx: Context<CloseProofBuffer>) -> Result<()> {
        instructions::close_proof_buffer::handler(ctx)
    }

    pub fn claim(ctx: Context<Claim>, leaf_index: u64, fee_bps: u16) -> Result<()> {
        instructions::claim::handler(ctx, leaf_index, fee_bps)
    }

    pub fn pause_pool(ctx: Context<PausePool>) -> Result<()> {
        instructions::admin::pause::handler(ctx)
    }

    pub fn unpause_pool(ctx: Context<UnpausePool>) -> Result<()> {
        instructions::admin::unpause::handler(ctx)
    }

    pub fn update_authority(ctx: Context<UpdateAuthority>, new_admin: Pubkey) -> Result<()> {
        instructions::admin::update_authority::handler(ctx, new_admin)
    }
}
