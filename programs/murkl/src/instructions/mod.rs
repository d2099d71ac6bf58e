//! Instruction handlers for the Murkl program

pub mod admin;
pub mod claim;
pub mod close_proof_buffer;
pub mod create_proof_buffer;
pub mod deposit;
pub mod finalize_proof_buffer;
pub mod initialize_pool;
pub mod upload_chunk;

pub use admin::*;
pub use claim::*;
pub use close_proof_buffer::*;
pub use create_proof_buffer::*;
pub use deposit::*;
pub use finalize_proof_buffer::*;
pub use initialize_pool::*;
pub use upload_chunk::*;
