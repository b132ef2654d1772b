use serde::{Deserialize, Serialize};

use super::digest::{Digest, DIGEST_SIZE};
use super::hashers::MerkleHasher;
use crate::utils::bits::encode_count;

/// Domain-separation prefix applied to raw elements before they enter the
/// tree as leaves. Keeps leaf hashes disjoint from internal-node hashes.
pub const LEAF_PREFIX: u8 = 0x00;

/// Ordering convention applied when two digests are combined into a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingMode {
    /// Children are concatenated left-to-right as supplied.
    Preserved,
    /// Children are sorted byte-wise ascending before concatenation,
    /// producing an order-independent combination.
    Sorted,
}

/// Combines two digests into their parent: `H(left || right)`, with the
/// pair sorted first under [`PairingMode::Sorted`].
pub fn combine<H: MerkleHasher>(left: &Digest, right: &Digest, mode: PairingMode) -> Digest {
    let (first, second) = match mode {
        PairingMode::Sorted if right.as_bytes() < left.as_bytes() => (right, left),
        _ => (left, right),
    };
    let mut buffer = [0u8; DIGEST_SIZE * 2];
    buffer[..DIGEST_SIZE].copy_from_slice(first.as_bytes());
    buffer[DIGEST_SIZE..].copy_from_slice(second.as_bytes());
    H::hash(&buffer)
}

/// Hashes a raw element into its leaf digest: `H(0x00 || element)`.
pub fn hash_leaf<H: MerkleHasher>(element: &[u8]) -> Digest {
    let mut buffer = Vec::with_capacity(element.len() + 1);
    buffer.push(LEAF_PREFIX);
    buffer.extend_from_slice(element);
    H::hash(&buffer)
}

/// Commitment binding a root to the number of elements beneath it:
/// `H(encode_count(element_count) || root)`.
///
/// The count is always the left child and the pair is never sorted, so the
/// commitment cannot be forged by swapping the operands.
pub fn mixed_root<H: MerkleHasher>(element_count: u32, root: &Digest) -> Digest {
    let encoded = Digest::from_bytes(encode_count(element_count));
    combine::<H>(&encoded, root, PairingMode::Preserved)
}
