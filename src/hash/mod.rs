//! Hashing layer for the proof algorithms.
//!
//! The tree logic treats the hash primitive as an opaque function
//! `H: bytes -> 32-byte digest` behind the [`MerkleHasher`] trait, and only
//! fixes the conventions layered on top of it:
//!
//! * leaves are hashed as `H(0x00 || element)` ([`hash_leaf`]);
//! * internal nodes are `H(left || right)`, optionally with the pair sorted
//!   byte-wise first ([`combine`], [`PairingMode`]);
//! * roots are committed together with their element count as a mixed root
//!   ([`mixed_root`]).
//!
//! Two backends are provided: Blake2s as the deterministic reference and
//! BLAKE3 for byte-oriented throughput.

pub mod combine;
pub mod digest;
pub mod hashers;

pub use combine::{combine, hash_leaf, mixed_root, PairingMode, LEAF_PREFIX};
pub use digest::{Digest, HexOutput, DIGEST_SIZE};
pub use hashers::{Blake2sMerkleHasher, Blake3MerkleHasher, MerkleHasher};
