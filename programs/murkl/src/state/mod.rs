//! State account definitions for the Murkl program

pub mod deposit_record;
pub mod merkle_tree;
pub mod nullifier_record;
pub mod pool;
pub mod proof_buffer;

pub use deposit_record::DepositRecord;
pub use merkle_tree::MerkleTree;
pub use nullifier_record::NullifierRecord;
pub use pool::Pool;
pub use proof_buffer::{BufferState, ProofBuffer};
