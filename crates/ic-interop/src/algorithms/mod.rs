//! Pure algorithms: Merkle accumulators, sparse Merkle proofs and validator
//! arithmetic.

pub mod merkle_tree;
pub mod sparse_merkle;
pub mod validators;

pub use merkle_tree::{
    branch_hash, leaf_hash, merkle_root, right_witness, root_from_right_witness, sha256,
    MerkleAccumulator,
};
pub use sparse_merkle::{
    calculate_root, decode_bitmap, encode_bitmap, verify, QueryProof, SparseMerkleProof,
    SparseMerkleTree,
};
pub use validators::{calculate_new_active_validators, compute_validators_hash};
