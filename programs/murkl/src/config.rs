//! Protocol limits injected into buffer state transitions
//!
//! Each pool stores its own `BufferLimits`, chosen at `initialize_pool`.
//! Buffer instructions read them from the pool account.

use anchor_lang::prelude::*;

use crate::error::MurklError;

/// Size limits for proof buffers and chunk uploads.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferLimits {
    /// Largest transcript a buffer may be created for
    pub max_proof_size: u32,
    /// Largest payload accepted by a single `upload_chunk`
    pub max_chunk_size: u32,
}

impl BufferLimits {
    /// Serialized size inside an account
    pub const LEN: usize = 4 + 4;

    /// Hard ceiling on `max_proof_size`. 8 KiB of proof keeps the whole buffer
    /// account (data, coverage bitmap and header) below the 10 KiB limit for
    /// accounts created through CPI.
    pub const MAX_PROOF_SIZE_CEILING: u32 = 8 * 1024;

    /// 900-byte chunks leave room for accounts and signatures in a 1232-byte
    /// transaction.
    pub const DEFAULT: BufferLimits = BufferLimits {
        max_proof_size: Self::MAX_PROOF_SIZE_CEILING,
        max_chunk_size: 900,
    };

    pub fn validate(&self) -> Result<()> {
        require!(
            self.max_chunk_size > 0
                && self.max_chunk_size <= self.max_proof_size
                && self.max_proof_size <= Self::MAX_PROOF_SIZE_CEILING,
            MurklError::InvalidBufferLimits
        );
        Ok(())
    }
}

impl Default for BufferLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}
