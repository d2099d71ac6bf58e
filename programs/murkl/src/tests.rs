//! Scenario and property suites for the Murkl program
//!
//! # Test Categories
//!
//! 1. **Claim Flow**: deposit, upload, finalize and claim end to end
//! 2. **Claim Guards**: every claim precondition and its error
//! 3. **Property Tests**: codec, derivations, chunk coverage, fee split

#[cfg(test)]
mod claim_flow_tests {
    use anchor_lang::prelude::Pubkey;

    use crate::config::BufferLimits;
    use crate::crypto::hash::{compute_commitment, compute_nullifier, hash_identifier, hash_password};
    use crate::crypto::verifier::{PublicInputs, StarkVerifier};
    use crate::error::MurklError;
    use crate::instructions::claim::{apply_claim, authorize_claim, ClaimPayout};
    use crate::instructions::deposit::{apply_deposit, validate_deposit};
    use crate::relayer::{plan_chunks, ClaimRequest};
    use crate::state::{DepositRecord, MerkleTree, NullifierRecord, Pool, ProofBuffer};
    use crate::test_utils::{assert_murkl_err, encoded_fixture, test_pool, test_tree};

    /// Pool, tree, deposit records and a simulated vault balance.
    pub(super) struct Harness {
        pub pool_key: Pubkey,
        pub pool: Pool,
        pub tree: MerkleTree,
        pub deposits: Vec<DepositRecord>,
        pub vault_balance: u64,
    }

    impl Harness {
        pub fn new() -> Self {
            let pool_key = Pubkey::new_unique();
            Self {
                pool_key,
                pool: test_pool(Pubkey::new_unique()),
                tree: test_tree(pool_key),
                deposits: Vec::new(),
                vault_balance: 0,
            }
        }

        pub fn deposit(&mut self, amount: u64, commitment: [u8; 32]) -> u64 {
            validate_deposit(&self.pool, &self.tree, amount, &commitment).unwrap();
            let mut record = DepositRecord::default();
            let leaf = apply_deposit(
                &mut self.pool,
                self.pool_key,
                &mut self.tree,
                &mut record,
                amount,
                commitment,
                255,
            )
            .unwrap();
            self.deposits.push(record);
            self.vault_balance += amount;
            leaf
        }

        pub fn claim(
            &mut self,
            buffer: &ProofBuffer,
            relayer: &Pubkey,
            leaf: u64,
            record: &mut NullifierRecord,
            fee_bps: u16,
        ) -> anchor_lang::Result<ClaimPayout> {
            let deposit = &mut self.deposits[leaf as usize];
            let payout = authorize_claim(
                &self.pool,
                &self.tree,
                buffer,
                relayer,
                deposit,
                record,
                self.vault_balance,
                fee_bps,
            )?;
            apply_claim(
                &mut self.pool,
                self.pool_key,
                deposit,
                record,
                buffer.nullifier,
                1_700_000_000,
                42,
                254,
            )?;
            self.vault_balance -= payout.amount;
            Ok(payout)
        }
    }

    /// Upload the fixture proof for `inputs` and verify it.
    pub(super) fn finalized_buffer(owner: Pubkey, inputs: PublicInputs) -> ProofBuffer {
        let limits = BufferLimits::DEFAULT;
        let proof = encoded_fixture(&inputs);
        let mut buffer = ProofBuffer::default();
        buffer
            .initialize(owner, Pubkey::new_unique(), proof.len() as u32, 255, &limits)
            .unwrap();
        for chunk in plan_chunks(&proof, limits.max_chunk_size).unwrap() {
            buffer
                .upload_chunk(&owner, chunk.offset, chunk.data, &limits)
                .unwrap();
        }
        buffer
            .finalize_and_verify(&owner, &inputs, &StarkVerifier::default())
            .unwrap();
        buffer
    }

    #[test]
    fn test_full_claim_flow() {
        let mut h = Harness::new();
        let id_hash = hash_identifier("@alice");
        let secret_hash = hash_password("testpass123");
        let commitment = compute_commitment(id_hash, secret_hash);

        h.deposit(1_000_000, [0x01u8; 32]);
        let leaf = h.deposit(1_000_000, commitment);
        assert_eq!(leaf, 1);
        assert_eq!(h.vault_balance, 2_000_000);

        let nullifier = compute_nullifier(secret_hash, leaf).unwrap();
        let inputs = PublicInputs::new(commitment, nullifier, h.tree.current_root);
        let relayer = Pubkey::new_unique();
        let buffer = finalized_buffer(relayer, inputs);

        let mut record = NullifierRecord::default();
        let payout = h.claim(&buffer, &relayer, leaf, &mut record, 100).unwrap();
        assert_eq!(
            payout,
            ClaimPayout {
                amount: 1_000_000,
                recipient_amount: 990_000,
                relayer_fee: 10_000,
            }
        );
        assert!(h.deposits[1].claimed);
        assert!(!h.deposits[0].claimed);
        assert!(record.is_consumed());
        assert_eq!(record.nullifier, nullifier);
        assert_eq!(record.pool, h.pool_key);
        assert_eq!(h.pool.total_claims, 1);
        assert_eq!(h.vault_balance, 1_000_000);

        // Replaying the same claim is rejected and pays nothing.
        assert_murkl_err(
            h.claim(&buffer, &relayer, leaf, &mut record, 100),
            MurklError::AlreadyClaimed,
        );
        assert_eq!(h.vault_balance, 1_000_000);
        assert_eq!(h.pool.total_claims, 1);
    }

    #[test]
    fn test_nullifier_reuse_across_deposits() {
        let mut h = Harness::new();
        let first = h.deposit(500, [0x0au8; 32]);
        let second = h.deposit(700, [0x0bu8; 32]);
        let root = h.tree.current_root;
        let nullifier = [0x5eu8; 32];
        let relayer = Pubkey::new_unique();

        let mut record = NullifierRecord::default();
        let buf_a = finalized_buffer(relayer, PublicInputs::new([0x0au8; 32], nullifier, root));
        h.claim(&buf_a, &relayer, first, &mut record, 0).unwrap();
        assert_eq!(h.vault_balance, 700);

        // Same nullifier PDA, different deposit.
        let buf_b = finalized_buffer(relayer, PublicInputs::new([0x0bu8; 32], nullifier, root));
        assert_murkl_err(
            h.claim(&buf_b, &relayer, second, &mut record, 0),
            MurklError::NullifierAlreadyUsed,
        );
        assert!(!h.deposits[second as usize].claimed);
        assert_eq!(h.vault_balance, 700);
    }

    /// The public inputs carry no recipient, so identical transcript bytes
    /// finalize in anyone's buffer. Whoever claims first is paid.
    #[test]
    fn test_copied_transcript_claims_for_first_submitter() {
        let mut h = Harness::new();
        let secret = hash_password("testpass123");
        let commitment = compute_commitment(hash_identifier("@alice"), secret);
        let leaf = h.deposit(5_000, commitment);
        let nullifier = compute_nullifier(secret, leaf).unwrap();
        let inputs = PublicInputs::new(commitment, nullifier, h.tree.current_root);

        let honest = Pubkey::new_unique();
        let copier = Pubkey::new_unique();
        let original = finalized_buffer(honest, inputs);
        let copy = finalized_buffer(copier, inputs);
        assert_eq!(copy.data, original.data);
        assert_eq!(copy.public_inputs(), original.public_inputs());

        let mut record = NullifierRecord::default();
        let payout = h.claim(&copy, &copier, leaf, &mut record, 0).unwrap();
        assert_eq!(payout.recipient_amount, 5_000);
        assert_murkl_err(
            h.claim(&original, &honest, leaf, &mut record, 0),
            MurklError::AlreadyClaimed,
        );
    }

    #[test]
    fn test_relayer_request_to_claim() {
        let mut h = Harness::new();
        let commitment = compute_commitment(hash_identifier("Bob@Example"), hash_password("pw"));
        let leaf = h.deposit(10_000, commitment);
        let nullifier = compute_nullifier(hash_password("pw"), leaf).unwrap();
        let inputs = PublicInputs::new(commitment, nullifier, h.tree.current_root);
        let proof = encoded_fixture(&inputs);

        let request = ClaimRequest {
            proof: hex::encode(&proof),
            commitment: hex::encode(commitment),
            nullifier: hex::encode(nullifier),
            merkle_root: format!("0x{}", hex::encode(inputs.merkle_root)),
            leaf_index: leaf,
            recipient_token_account: Pubkey::new_unique().to_string(),
            pool_address: h.pool_key.to_string(),
            fee_bps: 250,
        };
        let submission = request.decode().unwrap();
        assert_eq!(submission.inputs, inputs);

        let limits = BufferLimits::DEFAULT;
        let relayer = Pubkey::new_unique();
        let mut buffer = ProofBuffer::default();
        buffer
            .initialize(relayer, submission.pool, submission.proof.len() as u32, 1, &limits)
            .unwrap();
        // Upload back to front; order does not matter.
        for chunk in submission.upload_plan(&limits).unwrap().into_iter().rev() {
            buffer
                .upload_chunk(&relayer, chunk.offset, chunk.data, &limits)
                .unwrap();
        }
        buffer
            .finalize_and_verify(&relayer, &submission.inputs, &StarkVerifier::default())
            .unwrap();

        let mut record = NullifierRecord::default();
        let payout = h
            .claim(&buffer, &relayer, submission.leaf_index, &mut record, submission.fee_bps)
            .unwrap();
        assert_eq!(payout.relayer_fee, 250);
        assert_eq!(payout.recipient_amount, 9_750);
    }
}

#[cfg(test)]
mod claim_guard_tests {
    use anchor_lang::prelude::Pubkey;

    use super::claim_flow_tests::{finalized_buffer, Harness};
    use crate::config::BufferLimits;
    use crate::crypto::verifier::PublicInputs;
    use crate::error::MurklError;
    use crate::instructions::claim::authorize_claim;
    use crate::state::{NullifierRecord, ProofBuffer};
    use crate::test_utils::assert_murkl_err;

    const COMMITMENT: [u8; 32] = [0xc0u8; 32];
    const NULLIFIER: [u8; 32] = [0x4eu8; 32];

    struct Setup {
        h: Harness,
        leaf: u64,
        relayer: Pubkey,
        buffer: ProofBuffer,
    }

    fn setup() -> Setup {
        let mut h = Harness::new();
        let leaf = h.deposit(10_000, COMMITMENT);
        let relayer = Pubkey::new_unique();
        let buffer = finalized_buffer(
            relayer,
            PublicInputs::new(COMMITMENT, NULLIFIER, h.tree.current_root),
        );
        Setup {
            h,
            leaf,
            relayer,
            buffer,
        }
    }

    fn check(s: &Setup, buffer: &ProofBuffer, relayer: &Pubkey, vault: u64, fee_bps: u16) -> anchor_lang::Result<()> {
        authorize_claim(
            &s.h.pool,
            &s.h.tree,
            buffer,
            relayer,
            &s.h.deposits[s.leaf as usize],
            &NullifierRecord::default(),
            vault,
            fee_bps,
        )
        .map(|_| ())
    }

    #[test]
    fn test_valid_claim_passes() {
        let s = setup();
        assert!(check(&s, &s.buffer, &s.relayer, s.h.vault_balance, 500).is_ok());
    }

    #[test]
    fn test_paused_pool() {
        let mut s = setup();
        s.h.pool.set_paused(true);
        assert_murkl_err(
            check(&s, &s.buffer, &s.relayer, s.h.vault_balance, 0),
            MurklError::PoolPaused,
        );
    }

    #[test]
    fn test_buffer_owned_by_someone_else() {
        let s = setup();
        assert_murkl_err(
            check(&s, &s.buffer, &Pubkey::new_unique(), s.h.vault_balance, 0),
            MurklError::Unauthorized,
        );
    }

    #[test]
    fn test_unfinalized_buffer() {
        let s = setup();
        let mut pending = ProofBuffer::default();
        pending
            .initialize(s.relayer, s.h.pool_key, 64, 0, &BufferLimits::DEFAULT)
            .unwrap();
        assert_murkl_err(
            check(&s, &pending, &s.relayer, s.h.vault_balance, 0),
            MurklError::BufferNotFinalized,
        );
    }

    #[test]
    fn test_commitment_mismatch() {
        let s = setup();
        let other = finalized_buffer(
            s.relayer,
            PublicInputs::new([0xd0u8; 32], NULLIFIER, s.h.tree.current_root),
        );
        assert_murkl_err(
            check(&s, &other, &s.relayer, s.h.vault_balance, 0),
            MurklError::CommitmentMismatch,
        );
    }

    #[test]
    fn test_root_from_before_deposit_is_stale() {
        let mut h = Harness::new();
        h.deposit(10_000, [0x01u8; 32]);
        let before = h.tree.current_root;
        let leaf = h.deposit(10_000, COMMITMENT);
        let relayer = Pubkey::new_unique();
        let buffer = finalized_buffer(relayer, PublicInputs::new(COMMITMENT, NULLIFIER, before));
        let s = Setup {
            h,
            leaf,
            relayer,
            buffer,
        };
        assert_murkl_err(
            check(&s, &s.buffer, &s.relayer, s.h.vault_balance, 0),
            MurklError::StaleMerkleRoot,
        );
    }

    #[test]
    fn test_later_root_is_accepted() {
        let mut s = setup();
        s.h.deposit(10_000, [0x02u8; 32]);
        // Buffer root is from before the second deposit, still covers leaf 0.
        assert!(check(&s, &s.buffer, &s.relayer, s.h.vault_balance, 0).is_ok());
    }

    #[test]
    fn test_fee_over_pool_max() {
        let s = setup();
        assert_murkl_err(
            check(&s, &s.buffer, &s.relayer, s.h.vault_balance, 501),
            MurklError::FeeExceedsMax,
        );
    }

    #[test]
    fn test_vault_short() {
        let s = setup();
        assert_murkl_err(
            check(&s, &s.buffer, &s.relayer, 9_999, 0),
            MurklError::InsufficientBalance,
        );
    }

    #[test]
    fn test_claimed_deposit_reported_before_stale_root() {
        let mut s = setup();
        s.h.deposits[s.leaf as usize].claimed = true;
        s.h.deposits[s.leaf as usize].leaf_index = 99;
        assert_murkl_err(
            check(&s, &s.buffer, &s.relayer, s.h.vault_balance, 0),
            MurklError::AlreadyClaimed,
        );
    }
}

// ============================================================================
// PROPERTY-BASED TESTS (using proptest)
// ============================================================================

#[cfg(test)]
mod property_tests {
    use anchor_lang::prelude::Pubkey;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
    use solana_program::keccak;

    use crate::config::BufferLimits;
    use crate::crypto::hash::{
        compute_commitment, compute_nullifier, hash_identifier, hash_password, hash_two_to_one,
    };
    use crate::crypto::m31::{M31, M31_PRIME};
    use crate::crypto::transcript::StarkProof;
    use crate::crypto::verifier::{
        AcceptAllVerifier, ProofVerifier, StarkVerifier, VerifierConfig,
    };
    use crate::error::MurklError;
    use crate::relayer::plan_chunks;
    use crate::state::{Pool, ProofBuffer};
    use crate::test_utils::{
        assert_murkl_err, build_fixture, encoded_fixture, sample_inputs, FixtureParams,
    };

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_transcript_roundtrip_and_verifies(
            log_domain in 4usize..=8,
            n_layers in 1usize..=2,
            n_queries in 1usize..=6,
            final_poly_len in 1usize..=4,
            seed in any::<u64>(),
        ) {
            let inputs = sample_inputs();
            let params = FixtureParams { log_domain, n_layers, n_queries, final_poly_len, seed };
            let proof = build_fixture(&inputs, params);
            let bytes = proof.encode().unwrap();
            prop_assert_eq!(bytes.len(), proof.encoded_len());
            prop_assert_eq!(StarkProof::decode(&bytes).unwrap(), proof.clone());

            let verifier = StarkVerifier::new(VerifierConfig { min_queries: 1, ..VerifierConfig::DEFAULT });
            prop_assert!(verifier.verify(&proof, &inputs).is_ok());
        }

        #[test]
        fn prop_truncated_transcript_rejected(cut in 0usize..3_000) {
            let bytes = encoded_fixture(&sample_inputs());
            let cut = cut % bytes.len();
            prop_assert!(StarkProof::decode(&bytes[..cut]).is_err());
        }
    }

    proptest! {
        #[test]
        fn prop_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let _ = StarkProof::decode(&bytes);
        }

        #[test]
        fn prop_derivations_deterministic(
            identifier in "[a-zA-Z0-9@._-]{1,32}",
            password in ".{0,32}",
            leaf_index in 0u64..=u32::MAX as u64,
        ) {
            let id = hash_identifier(&identifier);
            let secret = hash_password(&password);
            prop_assert!(id.value() < M31_PRIME);
            prop_assert!(secret.value() < M31_PRIME);
            prop_assert_eq!(hash_identifier(&identifier.to_uppercase()), id);
            prop_assert_eq!(compute_commitment(id, secret), compute_commitment(id, secret));
            prop_assert_eq!(
                compute_nullifier(secret, leaf_index).unwrap(),
                compute_nullifier(secret, leaf_index).unwrap()
            );
        }

        #[test]
        fn prop_derivations_domain_separated(identifier in "[a-z0-9@._-]{1,32}") {
            let untagged = M31::from_digest(&keccak::hash(identifier.as_bytes()).to_bytes());
            prop_assert_ne!(hash_identifier(&identifier), untagged);
            prop_assert_ne!(hash_identifier(&identifier), hash_password(&identifier));
        }

        #[test]
        fn prop_commitment_and_nullifier_domain_separated(a in any::<u32>(), b in any::<u32>()) {
            let x = M31::new(a);
            let y = M31::new(b);
            let untagged = keccak::hashv(&[&x.to_le_bytes(), &y.to_le_bytes()]).to_bytes();

            let commitment = compute_commitment(x, y);
            let nullifier = compute_nullifier(x, y.value() as u64).unwrap();
            prop_assert_ne!(commitment, untagged);
            prop_assert_ne!(nullifier, untagged);
            prop_assert_ne!(commitment, nullifier);
        }

        #[test]
        fn prop_nullifier_rejects_wide_leaf_index(leaf_index in (u32::MAX as u64 + 1)..=u64::MAX) {
            assert_murkl_err(
                compute_nullifier(hash_password("pw"), leaf_index),
                MurklError::LeafIndexOverflow,
            );
        }

        #[test]
        fn prop_merkle_hash_non_commutative(
            left in prop::array::uniform32(any::<u8>()),
            right in prop::array::uniform32(any::<u8>()),
        ) {
            prop_assume!(left != right);
            prop_assert_ne!(hash_two_to_one(&left, &right), hash_two_to_one(&right, &left));
        }

        #[test]
        fn prop_chunks_in_any_order_cover_buffer(
            data in prop::collection::vec(any::<u8>(), 1..2_000),
            chunk_size in 1u32..=900,
            seed in any::<u64>(),
        ) {
            let owner = Pubkey::new_unique();
            let limits = BufferLimits::DEFAULT;
            let mut chunks = plan_chunks(&data, chunk_size).unwrap();
            chunks.shuffle(&mut StdRng::seed_from_u64(seed));

            let mut buffer = ProofBuffer::default();
            buffer.initialize(owner, Pubkey::new_unique(), data.len() as u32, 0, &limits).unwrap();
            for chunk in &chunks {
                buffer.upload_chunk(&owner, chunk.offset, chunk.data, &limits).unwrap();
            }
            prop_assert!(buffer.is_fully_covered());
            prop_assert_eq!(buffer.size as usize, data.len());
            prop_assert_eq!(&buffer.data, &data);
        }

        #[test]
        fn prop_missing_chunk_blocks_finalize(
            data in prop::collection::vec(any::<u8>(), 2..2_000),
            chunk_size in 1u32..=900,
            skip in any::<prop::sample::Index>(),
        ) {
            let owner = Pubkey::new_unique();
            let limits = BufferLimits::DEFAULT;
            let chunks = plan_chunks(&data, chunk_size).unwrap();
            prop_assume!(chunks.len() > 1);
            let skipped = skip.index(chunks.len());

            let mut buffer = ProofBuffer::default();
            buffer.initialize(owner, Pubkey::new_unique(), data.len() as u32, 0, &limits).unwrap();
            for (i, chunk) in chunks.iter().enumerate() {
                if i != skipped {
                    buffer.upload_chunk(&owner, chunk.offset, chunk.data, &limits).unwrap();
                }
            }

            let expected = if skipped == chunks.len() - 1 {
                MurklError::SizeMismatch
            } else {
                MurklError::IncompleteUpload
            };
            assert_murkl_err(
                buffer.finalize_and_verify(&owner, &sample_inputs(), &AcceptAllVerifier),
                expected,
            );
            prop_assert!(!buffer.finalized);
        }

        #[test]
        fn prop_fee_split_conserves_amount(amount in any::<u64>(), fee_bps in 0u16..=500) {
            let mut pool = Pool::default();
            pool.initialize(
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                4,
                0,
                500,
                BufferLimits::DEFAULT,
                0,
            )
            .unwrap();
            let fee = pool.relayer_fee(amount, fee_bps).unwrap();
            prop_assert_eq!(fee as u128, amount as u128 * fee_bps as u128 / 10_000);
            prop_assert!(fee <= amount);
        }
    }
}
