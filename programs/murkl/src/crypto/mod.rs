//! Cryptographic primitives
//!
//! - `m31`: Mersenne-31 field and its degree-4 extension encoding
//! - `hash`: domain-separated Keccak derivations (identifier, password,
//!   commitment, nullifier, Merkle nodes)
//! - `channel`: Fiat-Shamir transcript channel
//! - `transcript`: binary STARK proof codec
//! - `verifier`: proof verification behind the `ProofVerifier` trait

pub mod channel;
pub mod hash;
pub mod m31;
pub mod transcript;
pub mod verifier;

pub use hash::{
    compute_commitment, compute_nullifier, hash_identifier, hash_password, hash_two_to_one,
    DerivationScheme,
};
pub use m31::{M31, QM31};
pub use transcript::{StarkProof, TranscriptError};
pub use verifier::{AcceptAllVerifier, ProofVerifier, PublicInputs, StarkVerifier, VerifierConfig};
