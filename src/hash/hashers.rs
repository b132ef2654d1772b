use blake2::{Blake2s256, Digest as _};

use super::digest::{Digest, DIGEST_SIZE};

/// Opaque hash primitive consumed by the tree algorithms.
///
/// Implementations wrap a collision-resistant hash producing 32-byte
/// digests. The tree logic only ever invokes `hash` with its own
/// concatenation and prefixing conventions, so backends stay oblivious to
/// tree shape.
pub trait MerkleHasher {
    /// Hashes an arbitrary byte sequence into a digest.
    fn hash(bytes: &[u8]) -> Digest;
}

/// Blake2s-backed hasher, the deterministic reference backend.
pub struct Blake2sMerkleHasher;

impl MerkleHasher for Blake2sMerkleHasher {
    fn hash(bytes: &[u8]) -> Digest {
        let mut hasher = Blake2s256::new();
        hasher.update(bytes);
        let output: [u8; DIGEST_SIZE] = hasher.finalize().into();
        Digest::from_bytes(output)
    }
}

/// BLAKE3-backed hasher for byte-oriented callers that prefer throughput.
pub struct Blake3MerkleHasher;

impl MerkleHasher for Blake3MerkleHasher {
    fn hash(bytes: &[u8]) -> Digest {
        Digest::from_bytes(*blake3::hash(bytes).as_bytes())
    }
}
