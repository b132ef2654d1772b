use crate::hash::{combine, Digest, MerkleHasher, PairingMode};
use crate::utils::bits::bit_count32;

use super::types::MerkleError;

/// Derives the root of a tree of `element_count` elements after appending
/// `appended_leaves`, given only the append basis.
///
/// The basis holds one digest per set bit of `element_count`: the roots
/// of the complete subtrees the unbalanced tree decomposes into, largest
/// subtree first. The walk pairs the new leaves two at a time and, every
/// time the attach position at a level is odd, merges the leading new node
/// with the next basis entry (consumed smallest subtree first). A trailing
/// node with no sibling carries up unchanged.
pub fn append_root<H: MerkleHasher>(
    element_count: u32,
    append_decommitments: &[Digest],
    appended_leaves: &[Digest],
    mode: PairingMode,
) -> Result<Digest, MerkleError> {
    if appended_leaves.is_empty() {
        return Err(MerkleError::EmptyLeaves);
    }
    let expected = bit_count32(element_count) as usize;
    if append_decommitments.len() != expected {
        return Err(MerkleError::LengthMismatch {
            expected,
            got: append_decommitments.len(),
        });
    }

    let mut hashes = appended_leaves.to_vec();
    let mut count = hashes.len();
    // Position of the first appended node at the current level.
    let mut index = element_count as usize;
    let mut next_decommitment = append_decommitments.len();

    while index > 0 || count > 1 {
        let mut read = 0usize;
        let mut write = 0usize;
        if index & 1 == 1 {
            // Odd attach position: the leading new node pairs with the
            // existing subtree root on its left.
            if next_decommitment == 0 {
                return Err(MerkleError::MalformedProof {
                    reason: "append basis exhausted",
                });
            }
            next_decommitment -= 1;
            hashes[write] = combine::<H>(
                &append_decommitments[next_decommitment],
                &hashes[read],
                mode,
            );
            read += 1;
            write += 1;
        }
        while read < count {
            if read + 1 < count {
                hashes[write] = combine::<H>(&hashes[read], &hashes[read + 1], mode);
                read += 2;
            } else {
                hashes[write] = hashes[read];
                read += 1;
            }
            write += 1;
        }
        count = write;
        index >>= 1;
    }

    Ok(hashes[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{Blake2sMerkleHasher, DIGEST_SIZE};

    type H = Blake2sMerkleHasher;

    fn digest(fill: u8) -> Digest {
        Digest::from_bytes([fill; DIGEST_SIZE])
    }

    #[test]
    fn rejects_empty_append() {
        let err = append_root::<H>(4, &[digest(1)], &[], PairingMode::Sorted).unwrap_err();
        assert!(matches!(err, MerkleError::EmptyLeaves));
    }

    #[test]
    fn rejects_wrong_basis_length() {
        let err =
            append_root::<H>(6, &[digest(1)], &[digest(2)], PairingMode::Sorted).unwrap_err();
        assert!(matches!(err, MerkleError::LengthMismatch { .. }));
    }

    #[test]
    fn append_to_empty_tree_builds_from_scratch() {
        // No basis needed: the appended leaves form the whole tree.
        let leaves = [digest(1), digest(2), digest(3)];
        let root = append_root::<H>(0, &[], &leaves, PairingMode::Preserved).unwrap();
        let pair = combine::<H>(&leaves[0], &leaves[1], PairingMode::Preserved);
        let expected = combine::<H>(&pair, &leaves[2], PairingMode::Preserved);
        assert_eq!(root, expected);
    }

    #[test]
    fn single_append_to_power_of_two_tree() {
        let old_root = digest(0x0a);
        let leaf = digest(0x0b);
        let root = append_root::<H>(4, &[old_root], &[leaf], PairingMode::Preserved).unwrap();
        // The lone leaf carries up until it meets the old root at the top.
        assert_eq!(
            root,
            combine::<H>(&old_root, &leaf, PairingMode::Preserved)
        );
    }
}
