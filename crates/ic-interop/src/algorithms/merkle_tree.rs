//! # Regular Merkle Tree
//!
//! Append-only Merkle accumulator used for channel inboxes and outboxes.
//!
//! - leaf   = SHA-256(0x00 ‖ value)
//! - branch = SHA-256(0x01 ‖ left ‖ right)
//! - empty  = SHA-256("")
//!
//! Trees are left-heavy: a tree over `n` leaves splits at the largest power
//! of two below `n`. The accumulator keeps only the roots of its complete
//! subtrees (`append_path`, smallest subtree first), so appending and
//! recomputing the root cost `O(log n)`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{Hash, InteropError, EMPTY_HASH};

/// Prefix of leaf preimages.
pub const LEAF_PREFIX: u8 = 0x00;
/// Prefix of branch preimages.
pub const BRANCH_PREFIX: u8 = 0x01;

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Leaf hash of `value`.
pub fn leaf_hash(value: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(value);
    hasher.finalize().into()
}

/// Branch hash of two children.
pub fn branch_hash(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([BRANCH_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Incremental Merkle accumulator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleAccumulator {
    /// Roots of the complete subtrees, smallest first. One entry per set
    /// bit of `size`.
    pub append_path: Vec<Hash>,
    /// Number of appended leaves
    pub size: u64,
    /// Current root
    pub root: Hash,
}

impl Default for MerkleAccumulator {
    fn default() -> Self {
        Self {
            append_path: Vec::new(),
            size: 0,
            root: EMPTY_HASH,
        }
    }
}

impl MerkleAccumulator {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `append_path` has one entry per set bit of `size`.
    pub fn is_consistent(&self) -> bool {
        self.append_path.len() == self.size.count_ones() as usize
    }

    /// Append a leaf with value `value`.
    pub fn append(&mut self, value: &[u8]) -> Result<(), InteropError> {
        if !self.is_consistent() {
            return Err(InteropError::InconsistentAccumulator(format!(
                "append path of {} entries for size {}",
                self.append_path.len(),
                self.size
            )));
        }

        let mut carry = leaf_hash(value);
        let mut merged = 0;
        let mut size = self.size;
        while size & 1 == 1 {
            carry = branch_hash(&self.append_path[merged], &carry);
            merged += 1;
            size >>= 1;
        }

        let mut append_path = Vec::with_capacity(self.append_path.len() + 1 - merged);
        append_path.push(carry);
        append_path.extend_from_slice(&self.append_path[merged..]);

        self.append_path = append_path;
        self.size += 1;
        self.root = root_of_append_path(&self.append_path);
        Ok(())
    }
}

/// Root of a tree given its append path.
pub fn root_of_append_path(append_path: &[Hash]) -> Hash {
    let Some((first, rest)) = append_path.split_first() else {
        return EMPTY_HASH;
    };
    rest.iter()
        .fold(*first, |acc, subtree| branch_hash(subtree, &acc))
}

/// Root of the tree over `values`, computed directly.
pub fn merkle_root<V: AsRef<[u8]>>(values: &[V]) -> Hash {
    let leaves: Vec<Hash> = values.iter().map(|v| leaf_hash(v.as_ref())).collect();
    subtree_root(&leaves)
}

fn subtree_root(leaves: &[Hash]) -> Hash {
    match leaves.len() {
        0 => EMPTY_HASH,
        1 => leaves[0],
        n => {
            let split = largest_power_of_two_below(n);
            branch_hash(
                &subtree_root(&leaves[..split]),
                &subtree_root(&leaves[split..]),
            )
        }
    }
}

fn largest_power_of_two_below(n: usize) -> usize {
    let mut split = 1;
    while split * 2 < n {
        split *= 2;
    }
    split
}

/// Root of a larger tree from the accumulator of its first `size` leaves and
/// the right witness: the roots of the subtrees to the right of the prefix,
/// lowest layer first.
pub fn root_from_right_witness(
    size: u64,
    append_path: &[Hash],
    right_witness: &[Hash],
) -> Result<Hash, InteropError> {
    if size == 0 {
        return if right_witness.is_empty() {
            Ok(EMPTY_HASH)
        } else {
            Err(InteropError::InvalidInboxUpdate(
                "right witness for an empty tree".into(),
            ))
        };
    }
    if append_path.len() != size.count_ones() as usize {
        return Err(InteropError::InconsistentAccumulator(format!(
            "append path of {} entries for size {}",
            append_path.len(),
            size
        )));
    }

    let layer = size.trailing_zeros();
    let mut index = (size >> layer) - 1;
    let mut current = append_path[0];
    let mut left = append_path[1..].iter();
    let mut right = right_witness.iter().peekable();
    let mut remaining_left = append_path.len() - 1;

    while remaining_left > 0 || right.peek().is_some() {
        if index & 1 == 1 {
            let Some(sibling) = left.next() else {
                return Err(InteropError::InconsistentAccumulator(
                    "append path exhausted".into(),
                ));
            };
            remaining_left -= 1;
            current = branch_hash(sibling, &current);
        } else if let Some(sibling) = right.next() {
            current = branch_hash(&current, sibling);
        }
        index >>= 1;
    }

    Ok(current)
}

/// Right witness of the first `prefix` leaves within the tree over
/// `values`. Relayers attach it to an inbox update that delivers only part
/// of the partner's outbox.
pub fn right_witness<V: AsRef<[u8]>>(
    prefix: usize,
    values: &[V],
) -> Result<Vec<Hash>, InteropError> {
    let total = values.len();
    if prefix == 0 || prefix > total {
        return Err(InteropError::InvalidInboxUpdate(format!(
            "prefix {prefix} outside 1..={total}"
        )));
    }
    let leaves: Vec<Hash> = values.iter().map(|v| leaf_hash(v.as_ref())).collect();

    let mut layer = prefix.trailing_zeros();
    let mut index = (prefix >> layer) - 1;
    let mut witness = Vec::new();
    loop {
        let width = 1usize << layer;
        if index == 0 && width >= total {
            break;
        }
        if index & 1 == 0 {
            let start = (index + 1) * width;
            if start < total {
                let end = (start + width).min(total);
                witness.push(subtree_root(&leaves[start..end]));
            }
        }
        index >>= 1;
        layer += 1;
    }
    Ok(witness)
}
