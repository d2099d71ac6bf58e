//! Test-only prover fixture
//!
//! Builds self-consistent transcripts: random trace, composition and FRI
//! layer evaluations committed in full Merkle trees, query indices drawn from
//! the same channel the verifier replays, and openings for each index.

use anchor_lang::error::Error;
use anchor_lang::prelude::Pubkey;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::BufferLimits;
use crate::crypto::hash::{hash_fri_leaf, hash_leaf, hash_two_to_one};
use crate::crypto::m31::{M31_PRIME, QM31};
use crate::crypto::transcript::{FriLayerOpening, MerklePath, QueryProof, StarkProof};
use crate::crypto::verifier::{derive_query_indices, PublicInputs};
use crate::error::MurklError;
use crate::state::{MerkleTree, Pool};

#[derive(Clone, Copy, Debug)]
pub struct FixtureParams {
    pub log_domain: usize,
    pub n_layers: usize,
    pub n_queries: usize,
    pub final_poly_len: usize,
    pub seed: u64,
}

impl Default for FixtureParams {
    fn default() -> Self {
        Self {
            log_domain: 6,
            n_layers: 2,
            n_queries: 4,
            final_poly_len: 1,
            seed: 7,
        }
    }
}

pub fn sample_inputs() -> PublicInputs {
    PublicInputs::new([0x11u8; 32], [0x22u8; 32], [0x33u8; 32])
}

/// Full binary Merkle tree over pre-hashed leaves.
pub struct FullTree {
    levels: Vec<Vec<[u8; 32]>>,
}

impl FullTree {
    pub fn new(leaves: Vec<[u8; 32]>) -> Self {
        assert!(leaves.len().is_power_of_two());
        let mut levels = vec![leaves];
        while levels.last().map_or(0, Vec::len) > 1 {
            let prev = levels.last().unwrap();
            let next = prev
                .chunks_exact(2)
                .map(|pair| hash_two_to_one(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    pub fn root(&self) -> [u8; 32] {
        self.levels.last().unwrap()[0]
    }

    pub fn open(&self, index: usize) -> MerklePath {
        let mut idx = index;
        let mut path = Vec::with_capacity(self.levels.len() - 1);
        for level in &self.levels[..self.levels.len() - 1] {
            path.push(level[idx ^ 1]);
            idx >>= 1;
        }
        path
    }
}

fn random_qm31(rng: &mut StdRng) -> QM31 {
    QM31([
        rng.gen_range(0..M31_PRIME),
        rng.gen_range(0..M31_PRIME),
        rng.gen_range(0..M31_PRIME),
        rng.gen_range(0..M31_PRIME),
    ])
}

pub fn build_fixture(inputs: &PublicInputs, params: FixtureParams) -> StarkProof {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let domain = 1usize << params.log_domain;

    let trace_values: Vec<[u8; 32]> = (0..domain).map(|_| rng.gen()).collect();
    let comp_values: Vec<[u8; 32]> = (0..domain).map(|_| rng.gen()).collect();
    let trace_tree = FullTree::new(trace_values.iter().map(hash_leaf).collect());
    let comp_tree = FullTree::new(comp_values.iter().map(hash_leaf).collect());

    let mut layer_cosets = Vec::with_capacity(params.n_layers);
    let mut layer_trees = Vec::with_capacity(params.n_layers);
    for layer in 0..params.n_layers {
        let n_leaves = 1usize << (params.log_domain - 2 * (layer + 1));
        let cosets: Vec<[QM31; 4]> = (0..n_leaves)
            .map(|_| {
                [
                    random_qm31(&mut rng),
                    random_qm31(&mut rng),
                    random_qm31(&mut rng),
                    random_qm31(&mut rng),
                ]
            })
            .collect();
        layer_trees.push(FullTree::new(cosets.iter().map(hash_fri_leaf).collect()));
        layer_cosets.push(cosets);
    }

    let mut proof = StarkProof {
        trace_commitment: trace_tree.root(),
        composition_commitment: comp_tree.root(),
        trace_oods: random_qm31(&mut rng),
        composition_oods: random_qm31(&mut rng),
        fri_layer_commitments: layer_trees.iter().map(FullTree::root).collect(),
        final_poly: (0..params.final_poly_len).map(|_| random_qm31(&mut rng)).collect(),
        queries: Vec::new(),
    };

    let indices = derive_query_indices(&proof, inputs, params.log_domain, params.n_queries);
    proof.queries = indices
        .into_iter()
        .map(|index| {
            let i = index as usize;
            let fri_layers = (0..params.n_layers)
                .map(|layer| {
                    let folded = i >> (2 * (layer + 1));
                    FriLayerOpening {
                        siblings: layer_cosets[layer][folded],
                        path: layer_trees[layer].open(folded),
                    }
                })
                .collect();
            QueryProof {
                index,
                trace_value: trace_values[i],
                trace_path: trace_tree.open(i),
                composition_value: comp_values[i],
                composition_path: comp_tree.open(i),
                fri_layers,
            }
        })
        .collect();

    proof
}

pub fn encoded_fixture(inputs: &PublicInputs) -> Vec<u8> {
    build_fixture(inputs, FixtureParams::default())
        .encode()
        .unwrap()
}

// ============================================================================
// ACCOUNT FIXTURES
// ============================================================================

pub fn test_pool(admin: Pubkey) -> Pool {
    let mut pool = Pool::default();
    pool.initialize(
        admin,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        4,
        100,
        500,
        BufferLimits::DEFAULT,
        255,
    )
    .unwrap();
    pool
}

pub fn test_tree(pool: Pubkey) -> MerkleTree {
    let mut tree = MerkleTree::default();
    tree.initialize(pool, 4, 30).unwrap();
    tree
}

// ============================================================================
// ERROR ASSERTIONS
// ============================================================================

pub fn error_code(err: Error) -> u32 {
    match err {
        Error::AnchorError(e) => e.error_code_number,
        Error::ProgramError(e) => panic!("unexpected program error {e:?}"),
    }
}

pub fn assert_murkl_err<T: std::fmt::Debug>(res: anchor_lang::Result<T>, expected: MurklError) {
    let name = expected.name();
    assert_eq!(error_code(res.unwrap_err()), u32::from(expected), "expected {name}");
}
