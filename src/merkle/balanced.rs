//! Index-based multi-proofs over balanced (power-of-two) trees.
//!
//! The tree is a 1-indexed level-order array of `2 * leaf_count` digests:
//! slot 1 holds the root, slots `leaf_count..` the leaves, and slot 0 the
//! mixed root binding the root to the leaf count. Generation walks every
//! internal level bottom-up recording the siblings a verifier cannot
//! derive; verification replays the walk with a FIFO queue seeded from the
//! claimed leaves.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::hash::{combine, hash_leaf, mixed_root, Digest, MerkleHasher, PairingMode};

use super::types::{Element, MerkleError, MultiProof};

#[cfg(feature = "parallel")]
const LEAF_HASH_CHUNK: usize = 128;

/// Complete binary tree over a power-of-two number of elements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancedTree {
    nodes: Vec<Digest>,
    elements: Vec<Element>,
    leaf_count: u32,
    mode: PairingMode,
}

impl BalancedTree {
    /// Builds the full tree from its elements.
    ///
    /// The element count must be a power of two; unbalanced sets belong to
    /// the flag-based proof path.
    pub fn from_elements<H: MerkleHasher>(
        elements: Vec<Element>,
        mode: PairingMode,
    ) -> Result<Self, MerkleError> {
        if elements.is_empty() {
            return Err(MerkleError::EmptyLeaves);
        }
        let count = elements.len();
        let leaf_count = u32::try_from(count).map_err(|_| MerkleError::DomainError {
            value: count as u64,
        })?;
        if !leaf_count.is_power_of_two() {
            return Err(MerkleError::UnbalancedLeafCount { count: leaf_count });
        }

        #[cfg(feature = "parallel")]
        let leaves: Vec<Digest> = if crate::utils::parallelism_enabled() {
            use rayon::prelude::*;
            // Hashing a leaf is cheap; batch enough of them per task that
            // the split overhead stays negligible.
            elements
                .par_iter()
                .with_min_len(LEAF_HASH_CHUNK)
                .map(|element| hash_leaf::<H>(element.as_bytes()))
                .collect()
        } else {
            elements
                .iter()
                .map(|element| hash_leaf::<H>(element.as_bytes()))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let leaves: Vec<Digest> = elements
            .iter()
            .map(|element| hash_leaf::<H>(element.as_bytes()))
            .collect();

        let mut nodes = vec![Digest::zero(); 2 * count];
        nodes[count..].copy_from_slice(&leaves);
        for i in (1..count).rev() {
            nodes[i] = combine::<H>(&nodes[2 * i], &nodes[2 * i + 1], mode);
        }
        nodes[0] = mixed_root::<H>(leaf_count, &nodes[1]);

        Ok(Self {
            nodes,
            elements,
            leaf_count,
            mode,
        })
    }

    /// Root of the element tree.
    pub fn root(&self) -> &Digest {
        &self.nodes[1]
    }

    /// Commitment binding the root to the leaf count.
    pub fn mixed_root(&self) -> &Digest {
        &self.nodes[0]
    }

    pub fn leaf_count(&self) -> u32 {
        self.leaf_count
    }

    pub fn pairing_mode(&self) -> PairingMode {
        self.mode
    }

    /// Generates a combined proof for the leaves at `indices` (strictly
    /// descending, unique).
    ///
    /// Every requested leaf is marked known, then each internal level is
    /// walked bottom-up: a known node whose sibling is unknown contributes
    /// that sibling as a decommitment, and knowledge propagates to the
    /// parent.
    pub fn multi_proof(&self, indices: &[u32]) -> Result<MultiProof, MerkleError> {
        validate_indices(indices, self.leaf_count)?;
        let leaf_count = self.leaf_count as usize;
        let mut known = vec![false; self.nodes.len()];
        for &index in indices {
            known[leaf_count + index as usize] = true;
        }
        let mut decommitments = Vec::new();
        for i in (1..leaf_count).rev() {
            let left = known[2 * i];
            let right = known[2 * i + 1];
            if left != right {
                let sibling = if left { 2 * i + 1 } else { 2 * i };
                decommitments.push(self.nodes[sibling]);
            }
            known[i] = left || right;
        }
        let elements = indices
            .iter()
            .map(|&index| self.elements[index as usize].clone())
            .collect();
        Ok(MultiProof {
            mixed_root: self.nodes[0],
            root: self.nodes[1],
            leaf_count: self.leaf_count,
            indices: indices.to_vec(),
            elements,
            decommitments,
        })
    }
}

fn validate_indices(indices: &[u32], leaf_count: u32) -> Result<(), MerkleError> {
    if indices.is_empty() {
        return Err(MerkleError::EmptyLeaves);
    }
    for window in indices.windows(2) {
        if window[0] == window[1] {
            return Err(MerkleError::DuplicateIndex { index: window[0] });
        }
        if window[0] < window[1] {
            return Err(MerkleError::MalformedProof {
                reason: "indices not strictly descending",
            });
        }
    }
    for &index in indices {
        if index >= leaf_count {
            return Err(MerkleError::IndexOutOfRange {
                index,
                max: leaf_count - 1,
            });
        }
    }
    Ok(())
}

/// Verifies a [`MultiProof`] against the caller's known mixed root.
///
/// Returns `Ok(false)` for any cryptographic mismatch: wrong mixed root,
/// wrong leaf count, or a reconstruction that lands on a different root.
/// Structural impossibilities (a drained queue, exhausted decommitments)
/// are [`MerkleError::MalformedProof`]: they cannot arise from any
/// honestly generated proof and must not be conflated with a stale root.
pub fn verify_multi_proof<H: MerkleHasher>(
    expected_mixed_root: &Digest,
    proof: &MultiProof,
    mode: PairingMode,
) -> Result<bool, MerkleError> {
    if proof.indices.len() != proof.elements.len() {
        return Err(MerkleError::LengthMismatch {
            expected: proof.indices.len(),
            got: proof.elements.len(),
        });
    }
    if !proof.leaf_count.is_power_of_two() {
        return Err(MerkleError::UnbalancedLeafCount {
            count: proof.leaf_count,
        });
    }
    validate_indices(&proof.indices, proof.leaf_count)?;

    if mixed_root::<H>(proof.leaf_count, &proof.root) != *expected_mixed_root {
        return Ok(false);
    }

    let mut queue: VecDeque<(u32, Digest)> = proof
        .indices
        .iter()
        .zip(proof.elements.iter())
        .map(|(&index, element)| {
            (
                proof.leaf_count + index,
                hash_leaf::<H>(element.as_bytes()),
            )
        })
        .collect();
    let mut next_decommitment = 0usize;

    loop {
        let (index, value) = queue
            .pop_front()
            .ok_or(MerkleError::MalformedProof {
                reason: "verification queue drained",
            })?;
        if index == 1 {
            if !queue.is_empty() {
                return Err(MerkleError::MalformedProof {
                    reason: "verification queue not drained at the root",
                });
            }
            return Ok(value == proof.root);
        }

        let queued_sibling = if index & 1 == 1 {
            match queue.front() {
                Some(&(front_index, sibling)) if front_index == index - 1 => {
                    queue.pop_front();
                    Some(sibling)
                }
                _ => None,
            }
        } else {
            None
        };

        let parent = match queued_sibling {
            Some(sibling) => combine::<H>(&sibling, &value, mode),
            None => {
                let sibling = *proof.decommitments.get(next_decommitment).ok_or(
                    MerkleError::MalformedProof {
                        reason: "decommitments exhausted",
                    },
                )?;
                next_decommitment += 1;
                if index & 1 == 1 {
                    combine::<H>(&sibling, &value, mode)
                } else {
                    combine::<H>(&value, &sibling, mode)
                }
            }
        };
        queue.push_back((index >> 1, parent));
    }
}
