//! Incremental Merkle Tree for commitment storage
//!
//! Append-only Keccak256 tree using the filled_subtrees pattern for
//! O(log n) insertions. Every root kept in history remembers how many leaves
//! the tree held when it was produced, so a claim can require a root that
//! already contains its deposit.

use anchor_lang::prelude::*;

use crate::crypto::hash::hash_two_to_one;
use crate::error::MurklError;

/// Maximum supported tree depth (2^24 = ~16M leaves)
pub const MAX_TREE_DEPTH: u8 = 24;

/// Minimum supported tree depth
pub const MIN_TREE_DEPTH: u8 = 4;

/// Root history bounds (keeps the account under the CPI allocation limit)
pub const MIN_ROOT_HISTORY_SIZE: u16 = 30;
pub const MAX_ROOT_HISTORY_SIZE: u16 = 200;

/// Incremental Merkle tree state account.
///
/// PDA Seeds: `[b"merkle_tree", pool.key().as_ref()]`
#[account]
#[derive(Default, Debug)]
pub struct MerkleTree {
    /// Reference to parent pool
    pub pool: Pubkey,

    /// Tree depth (immutable after init)
    pub depth: u8,

    /// Next leaf index to be filled (also = total leaves inserted)
    pub leaf_count: u64,

    /// Current root hash
    pub current_root: [u8; 32],

    /// Root history (circular buffer)
    pub root_history: Vec<[u8; 32]>,

    /// Leaf count at the time each history root was produced
    pub root_leaf_counts: Vec<u64>,

    /// Current position in circular root history buffer
    pub root_history_index: u16,

    /// Maximum root history size (set at init)
    pub root_history_size: u16,

    /// Rightmost non-zero hash at each level, length = depth
    pub filled_subtrees: Vec<[u8; 32]>,

    /// zeros[0] = empty leaf, zeros[i] = hash(zeros[i-1], zeros[i-1]), length = depth + 1
    pub zeros: Vec<[u8; 32]>,
}

impl MerkleTree {
    pub const SEED_PREFIX: &'static [u8] = b"merkle_tree";

    /// Calculate space needed for merkle tree account.
    pub fn space(depth: u8, root_history_size: u16) -> usize {
        let depth_usize = depth as usize;
        let history_usize = root_history_size as usize;

        8                                       // discriminator
            + 32                                // pool
            + 1                                 // depth
            + 8                                 // leaf_count
            + 32                                // current_root
            + 4 + (32 * history_usize)          // root_history (vec)
            + 4 + (8 * history_usize)           // root_leaf_counts (vec)
            + 2                                 // root_history_index
            + 2                                 // root_history_size
            + 4 + (32 * depth_usize)            // filled_subtrees (vec)
            + 4 + (32 * (depth_usize + 1))      // zeros (vec)
    }

    pub fn validate_params(depth: u8, root_history_size: u16) -> Result<()> {
        require!(
            (MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth),
            MurklError::InvalidTreeDepth
        );
        require!(
            (MIN_ROOT_HISTORY_SIZE..=MAX_ROOT_HISTORY_SIZE).contains(&root_history_size),
            MurklError::InvalidRootHistorySize
        );
        Ok(())
    }

    /// Initialize the Merkle tree with empty state.
    pub fn initialize(&mut self, pool: Pubkey, depth: u8, root_history_size: u16) -> Result<()> {
        Self::validate_params(depth, root_history_size)?;

        self.pool = pool;
        self.depth = depth;
        self.leaf_count = 0;
        self.root_history_index = 0;
        self.root_history_size = root_history_size;

        self.zeros = Self::compute_zero_values(depth);
        self.filled_subtrees = self.zeros[..depth as usize].to_vec();

        self.current_root = self.zeros[depth as usize];
        self.root_history = vec![[0u8; 32]; root_history_size as usize];
        self.root_leaf_counts = vec![0u64; root_history_size as usize];
        self.root_history[0] = self.current_root;

        Ok(())
    }

    /// Zero hash for each level, leaf level first.
    fn compute_zero_values(depth: u8) -> Vec<[u8; 32]> {
        let mut zeros = Vec::with_capacity((depth + 1) as usize);
        zeros.push([0u8; 32]);
        for i in 1..=depth {
            let prev = &zeros[(i - 1) as usize];
            let zero_at_level = hash_two_to_one(prev, prev);
            zeros.push(zero_at_level);
        }
        zeros
    }

    /// Insert a commitment leaf, returning its index.
    pub fn insert_leaf(&mut self, commitment: [u8; 32]) -> Result<u64> {
        require!(!self.is_full(), MurklError::MerkleTreeFull);

        let leaf_index = self.leaf_count;
        let mut current_hash = commitment;
        let mut current_index = leaf_index;

        for level in 0..self.depth as usize {
            let is_right_child = (current_index & 1) == 1;
            current_index >>= 1;

            if is_right_child {
                current_hash = hash_two_to_one(&self.filled_subtrees[level], &current_hash);
            } else {
                self.filled_subtrees[level] = current_hash;
                current_hash = hash_two_to_one(&current_hash, &self.zeros[level]);
            }
        }

        self.leaf_count = self
            .leaf_count
            .checked_add(1)
            .ok_or(error!(MurklError::ArithmeticOverflow))?;
        self.current_root = current_hash;

        self.root_history_index = (self.root_history_index + 1) % self.root_history_size;
        self.root_history[self.root_history_index as usize] = current_hash;
        self.root_leaf_counts[self.root_history_index as usize] = self.leaf_count;

        Ok(leaf_index)
    }

    /// Check if a root exists in recent history.
    pub fn is_known_root(&self, root: &[u8; 32]) -> bool {
        *root == self.current_root || self.root_history.iter().any(|r| r == root)
    }

    /// A root the tree held at or after the insertion of `leaf_index`.
    ///
    /// Roots that have rotated out of history are rejected.
    pub fn is_root_valid_for_leaf(&self, root: &[u8; 32], leaf_index: u64) -> bool {
        if leaf_index >= self.leaf_count {
            return false;
        }
        if *root == self.current_root {
            return true;
        }
        self.root_history
            .iter()
            .zip(self.root_leaf_counts.iter())
            .any(|(r, &count)| r == root && count > leaf_index)
    }

    /// Get tree capacity.
    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    /// Check if tree is full.
    pub fn is_full(&self) -> bool {
        self.leaf_count >= self.capacity()
    }
}
