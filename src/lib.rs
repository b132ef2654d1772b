//! Compact Merkle multi-proofs over append-only trees.
//!
//! The crate commits to an ordered list of byte elements and produces
//! proofs that a subset of them belongs to the commitment. Two proof
//! families are provided:
//!
//! * flag/skip proofs ([`CompactProof`], [`BooleanProof`]) reconstruct the
//!   root of an arbitrary, possibly unbalanced tree from the proved
//!   elements alone, and opportunistically recover the append basis needed
//!   to extend the tree without re-reading it;
//! * index-based proofs ([`MultiProof`]) commit balanced power-of-two
//!   trees through [`BalancedTree`] and verify against a mixed root that
//!   binds the element count.
//!
//! Roots after an update and append are derived with [`get_new_root_bits`]
//! or [`get_new_root_booleans`]; [`append_root`] composes a new root
//! directly from an append basis.

pub mod hash;
pub mod merkle;
pub mod utils;

pub use hash::{
    combine, hash_leaf, mixed_root, Blake2sMerkleHasher, Blake3MerkleHasher, Digest,
    MerkleHasher, PairingMode, DIGEST_SIZE,
};
pub use merkle::{
    append_root, get_new_root_bits, get_new_root_booleans, get_root_bits, get_root_booleans,
    minimum_index, verify_multi_proof, BalancedTree, BooleanProof, CompactProof, Element,
    MerkleError, MultiProof, RootInference, RootUpdate,
};
