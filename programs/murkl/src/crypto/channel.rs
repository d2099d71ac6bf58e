//! Fiat-Shamir channel over Keccak256
//!
//! The verifier replays the prover's transcript: every absorbed value reseeds
//! the digest, and draws are counter-indexed hashes of the current digest.

use solana_program::keccak;

pub const CHANNEL_DOMAIN: &[u8] = b"murkl_channel_v1";

#[derive(Clone, Debug)]
pub struct Channel {
    digest: [u8; 32],
    n_draws: u32,
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel {
    pub fn new() -> Self {
        Self {
            digest: keccak::hash(CHANNEL_DOMAIN).to_bytes(),
            n_draws: 0,
        }
    }

    /// Absorb bytes: digest = keccak(digest || data).
    pub fn mix(&mut self, data: &[u8]) {
        self.digest = keccak::hashv(&[self.digest.as_ref(), data]).to_bytes();
        self.n_draws = 0;
    }

    /// Squeeze a u32: first 4 LE bytes of keccak(digest || n_draws_le).
    pub fn draw_u32(&mut self) -> u32 {
        let out = keccak::hashv(&[self.digest.as_ref(), &self.n_draws.to_le_bytes()]).to_bytes();
        self.n_draws = self.n_draws.wrapping_add(1);
        u32::from_le_bytes([out[0], out[1], out[2], out[3]])
    }

    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }
}
