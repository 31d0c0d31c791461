//! # Sparse Merkle Tree
//!
//! Inclusion proofs over a 256-bit key space.
//!
//! - leaf   = SHA-256(0x00 ‖ key ‖ value)
//! - branch = SHA-256(0x01 ‖ left ‖ right)
//! - empty subtree = `EMPTY_HASH`
//!
//! A subtree holding a single leaf collapses to that leaf, so leaves sit at
//! the shallowest depth that separates them from every other key. Key bits
//! are read most significant first.
//!
//! Each query carries a bitmap: bit `d` tells whether the sibling at depth
//! `d + 1` on the query's path is non-empty. The bitmap is encoded as the
//! big-endian bytes of `(1 << depth) | path_bits`, so the leading set bit
//! marks the depth. Non-empty siblings that cannot be derived from another
//! query are read from `sibling_hashes` in the order the verifier needs them:
//! deepest node first, ties broken by key.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::merkle_tree::{branch_hash, LEAF_PREFIX};
use crate::domain::{Hash, InteropError, EMPTY_HASH};

/// Deepest possible leaf.
pub const MAX_DEPTH: usize = 256;

/// Leaf hash of `(key, value)`.
pub fn smt_leaf_hash(key: &Hash, value: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(key);
    hasher.update(value);
    hasher.finalize().into()
}

/// One proven key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryProof {
    /// Leaf key
    pub key: Hash,
    /// Leaf value
    pub value: Hash,
    /// Encoded sibling bitmap
    pub bitmap: Vec<u8>,
}

/// Multi-key inclusion proof.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseMerkleProof {
    /// Non-empty siblings not derivable from other queries
    pub sibling_hashes: Vec<Hash>,
    /// Proven keys
    pub queries: Vec<QueryProof>,
}

fn bit_at(key: &Hash, depth: usize) -> bool {
    (key[depth / 8] >> (7 - depth % 8)) & 1 == 1
}

fn shares_prefix(a: &Hash, b: &Hash, bits: usize) -> bool {
    (0..bits).all(|depth| bit_at(a, depth) == bit_at(b, depth))
}

/// Encode path bits (root side first) as a bitmap.
pub fn encode_bitmap(bits: &[bool]) -> Vec<u8> {
    let total = bits.len() + 1;
    let mut bytes = vec![0u8; total.div_ceil(8)];
    let mut set = |position: usize| {
        let from_right = total - 1 - position;
        let index = bytes.len() - 1 - from_right / 8;
        bytes[index] |= 1 << (from_right % 8);
    };
    set(0);
    for (i, bit) in bits.iter().enumerate() {
        if *bit {
            set(i + 1);
        }
    }
    bytes
}

/// Decode a bitmap into path bits (root side first).
pub fn decode_bitmap(bitmap: &[u8]) -> Result<Vec<bool>, InteropError> {
    let Some(first) = bitmap.first() else {
        return Err(InteropError::InvalidBitmap("empty bitmap".into()));
    };
    if *first == 0 {
        return Err(InteropError::InvalidBitmap("leading zero byte".into()));
    }
    let leading = first.leading_zeros() as usize;
    let total = bitmap.len() * 8 - leading;
    let depth = total - 1;
    if depth > MAX_DEPTH {
        return Err(InteropError::InvalidBitmap(format!("depth {depth} exceeds {MAX_DEPTH}")));
    }
    let bits = (leading + 1..bitmap.len() * 8)
        .map(|position| (bitmap[position / 8] >> (7 - position % 8)) & 1 == 1)
        .collect();
    Ok(bits)
}

/// A query climbing towards the root.
struct Cursor {
    key: Hash,
    hash: Hash,
    bits: Vec<bool>,
}

fn sort_cursors(cursors: &mut [Cursor]) {
    cursors.sort_by(|a, b| b.bits.len().cmp(&a.bits.len()).then(a.key.cmp(&b.key)));
}

/// Fold cursors to a single root. `sibling` supplies non-empty siblings
/// that no other cursor provides, given (key, depth of the sibling).
fn fold_cursors(
    mut cursors: Vec<Cursor>,
    mut sibling: impl FnMut(&Hash, usize) -> Result<Hash, InteropError>,
) -> Result<Hash, InteropError> {
    if cursors.is_empty() {
        return Err(InteropError::InvalidStateProof("no queries".into()));
    }
    sort_cursors(&mut cursors);
    cursors.dedup_by(|a, b| a.key == b.key && a.hash == b.hash && a.bits == b.bits);
    let mut seen = BTreeSet::new();
    if !cursors.iter().all(|cursor| seen.insert(cursor.key)) {
        return Err(InteropError::InvalidStateProof("conflicting queries for one key".into()));
    }

    loop {
        let mut cursor = cursors.remove(0);
        let height = cursor.bits.len();
        if height == 0 {
            if cursors.iter().all(|other| other.hash == cursor.hash) {
                return Ok(cursor.hash);
            }
            return Err(InteropError::InvalidStateProof("queries reach different roots".into()));
        }

        let depth = height - 1;
        let is_right = bit_at(&cursor.key, depth);
        let partner = cursors.iter().position(|other| {
            other.bits.len() == height
                && shares_prefix(&other.key, &cursor.key, depth)
                && bit_at(&other.key, depth) != is_right
        });
        let collides = cursors.iter().any(|other| {
            other.bits.len() == height && shares_prefix(&other.key, &cursor.key, height)
        });
        if collides {
            return Err(InteropError::InvalidStateProof("queries collide in one node".into()));
        }

        let sibling_hash = match partner {
            Some(position) => {
                if !cursor.bits[depth] {
                    return Err(InteropError::InvalidStateProof(
                        "bitmap marks a proven sibling as empty".into(),
                    ));
                }
                cursors.remove(position).hash
            }
            None if cursor.bits[depth] => sibling(&cursor.key, height)?,
            None => EMPTY_HASH,
        };

        cursor.hash = if is_right {
            branch_hash(&sibling_hash, &cursor.hash)
        } else {
            branch_hash(&cursor.hash, &sibling_hash)
        };
        cursor.bits.truncate(depth);
        cursors.push(cursor);
        sort_cursors(&mut cursors);
    }
}

fn cursors_of(queries: &[QueryProof]) -> Result<Vec<Cursor>, InteropError> {
    queries
        .iter()
        .map(|query| {
            Ok(Cursor {
                key: query.key,
                hash: smt_leaf_hash(&query.key, &query.value),
                bits: decode_bitmap(&query.bitmap)?,
            })
        })
        .collect()
}

/// Root implied by a proof. Fails on malformed bitmaps, missing siblings
/// or unused siblings.
pub fn calculate_root(
    sibling_hashes: &[Hash],
    queries: &[QueryProof],
) -> Result<Hash, InteropError> {
    let mut siblings = sibling_hashes.iter();
    let root = fold_cursors(cursors_of(queries)?, |_, _| {
        siblings
            .next()
            .copied()
            .ok_or_else(|| InteropError::InvalidStateProof("missing sibling hash".into()))
    })?;
    if siblings.next().is_some() {
        return Err(InteropError::InvalidStateProof("unused sibling hashes".into()));
    }
    Ok(root)
}

/// Whether `proof` proves its queries against `root`.
pub fn verify(root: &Hash, proof: &SparseMerkleProof) -> bool {
    matches!(
        calculate_root(&proof.sibling_hashes, &proof.queries),
        Ok(computed) if computed == *root
    )
}

/// In-memory sparse Merkle tree. Used to build proofs and by tests.
#[derive(Clone, Debug, Default)]
pub struct SparseMerkleTree {
    leaves: BTreeMap<Hash, Hash>,
}

impl SparseMerkleTree {
    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a leaf.
    pub fn insert(&mut self, key: Hash, value: Hash) {
        self.leaves.insert(key, value);
    }

    /// Remove a leaf.
    pub fn remove(&mut self, key: &Hash) -> Option<Hash> {
        self.leaves.remove(key)
    }

    /// Value of a leaf.
    pub fn get(&self, key: &Hash) -> Option<&Hash> {
        self.leaves.get(key)
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Current root.
    pub fn root(&self) -> Hash {
        let entries: Vec<(Hash, Hash)> = self.leaves.iter().map(|(k, v)| (*k, *v)).collect();
        subtree_hash(&entries, 0)
    }

    /// Inclusion proof of `keys`. Every key must be present.
    pub fn prove(&self, keys: &[Hash]) -> Result<SparseMerkleProof, InteropError> {
        let entries: Vec<(Hash, Hash)> = self.leaves.iter().map(|(k, v)| (*k, *v)).collect();

        let mut queries = Vec::with_capacity(keys.len());
        let mut cursors = Vec::with_capacity(keys.len());
        for key in keys {
            let value = *self
                .leaves
                .get(key)
                .ok_or_else(|| {
                    InteropError::InvalidStateProof(format!(
                        "key {} not in tree",
                        hex::encode(key)
                    ))
                })?;
            let bits = path_bits(&entries, key);
            queries.push(QueryProof {
                key: *key,
                value,
                bitmap: encode_bitmap(&bits),
            });
            cursors.push(Cursor {
                key: *key,
                hash: smt_leaf_hash(key, &value),
                bits,
            });
        }

        let mut sibling_hashes = Vec::new();
        fold_cursors(cursors, |key, depth| {
            let mut target = *key;
            let flip = depth - 1;
            target[flip / 8] ^= 1 << (7 - flip % 8);
            let subtree: Vec<(Hash, Hash)> = entries
                .iter()
                .filter(|(k, _)| shares_prefix(k, &target, depth))
                .copied()
                .collect();
            let hash = subtree_hash(&subtree, depth);
            sibling_hashes.push(hash);
            Ok(hash)
        })?;

        Ok(SparseMerkleProof {
            sibling_hashes,
            queries,
        })
    }
}

/// Hash of the subtree at `depth` holding `entries` (sorted by key, sharing
/// a `depth`-bit prefix).
fn subtree_hash(entries: &[(Hash, Hash)], depth: usize) -> Hash {
    match entries {
        [] => EMPTY_HASH,
        [(key, value)] => smt_leaf_hash(key, value),
        _ => {
            let split = entries.partition_point(|(key, _)| !bit_at(key, depth));
            branch_hash(
                &subtree_hash(&entries[..split], depth + 1),
                &subtree_hash(&entries[split..], depth + 1),
            )
        }
    }
}

/// Sibling non-emptiness along the path of `key`, root side first.
fn path_bits(entries: &[(Hash, Hash)], key: &Hash) -> Vec<bool> {
    let mut range = entries;
    let mut bits = Vec::new();
    let mut depth = 0;
    while range.len() > 1 {
        let split = range.partition_point(|(k, _)| !bit_at(k, depth));
        let (left, right) = range.split_at(split);
        if bit_at(key, depth) {
            bits.push(!left.is_empty());
            range = right;
        } else {
            bits.push(!right.is_empty());
            range = left;
        }
        depth += 1;
    }
    bits
}
