use core::fmt;
use serde::{Deserialize, Serialize};

use crate::hash::Digest;
use crate::utils::bits::BitField;

/// Raw byte value committed at a tree leaf.
///
/// Elements enter the tree as `H(0x00 || element)`; proofs carry the raw
/// bytes and verifiers re-hash them, so a producer can never smuggle an
/// internal node in as a leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    bytes: Vec<u8>,
}

impl Element {
    /// Creates an element from raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns a view of the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the element and returns its byte payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<&[u8]> for Element {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Element {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Flag-based multi-proof over an unbalanced tree, packed-bit encoding.
///
/// `flags` and `skips` are consumed as equal-length bit streams; the first
/// position where both are set is the end-of-proof sentinel. Decommitment
/// order matches the order in which zero-flag combinations consume them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactProof {
    /// Total number of elements in the tree the proof speaks about.
    pub element_count: u32,
    /// Bit `i` set: the right operand of step `i` is a produced hash.
    pub flags: BitField,
    /// Bit `i` set: step `i` carries a lone, sibling-less hash up a level.
    pub skips: BitField,
    /// External sibling hashes, consumed in step order.
    pub decommitments: Vec<Digest>,
}

/// Flag-based multi-proof, boolean-array encoding.
///
/// Equivalent to [`CompactProof`] except the step count is the array
/// length, so no end sentinel exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanProof {
    /// Total number of elements in the tree the proof speaks about.
    pub element_count: u32,
    /// `true`: the right operand of this step is a produced hash.
    pub flags: Vec<bool>,
    /// `true`: this step carries a lone, sibling-less hash up a level.
    pub skips: Vec<bool>,
    /// External sibling hashes, consumed in step order.
    pub decommitments: Vec<Digest>,
}

/// Index-based multi-proof over a balanced (power-of-two) tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiProof {
    /// Commitment binding `root` to `leaf_count`.
    pub mixed_root: Digest,
    /// Root of the element tree.
    pub root: Digest,
    /// Number of leaves; always a power of two.
    pub leaf_count: u32,
    /// Claimed leaf indices, strictly descending and unique.
    pub indices: Vec<u32>,
    /// Raw elements aligned to `indices`; verifiers re-hash them.
    pub elements: Vec<Element>,
    /// Sibling hashes for every claimed leaf whose sibling is unknown.
    pub decommitments: Vec<Digest>,
}

/// Result of interpreting a flag-based proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootInference {
    /// Root reconstructed from the claimed leaves and decommitments.
    pub root: Digest,
    /// Append basis inferred alongside the traversal, one digest per set
    /// bit of the element count. `None` when the proof does not anchor the
    /// unbalanced boundary and no basis could be derived.
    pub append_decommitments: Option<Vec<Digest>>,
}

/// Result of a combined update-and-append derivation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootUpdate {
    /// Root of the tree before any modification, for caller validation.
    pub root: Digest,
    /// Root after in-place updates and appended elements.
    pub new_root: Digest,
    /// Element count after the append.
    pub new_element_count: u32,
}

/// Canonical serialisation error domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerKind {
    CompactProof,
    MultiProof,
}

/// Errors emitted by the proof algorithms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// No elements supplied where at least one is required.
    EmptyLeaves,
    /// Parallel arrays supplied by the caller disagree in length.
    LengthMismatch { expected: usize, got: usize },
    /// A claimed leaf index does not fit the tree.
    IndexOutOfRange { index: u32, max: u32 },
    /// The same leaf index was claimed twice.
    DuplicateIndex { index: u32 },
    /// A balanced-tree operation was given a non-power-of-two leaf count.
    UnbalancedLeafCount { count: u32 },
    /// A numeric input falls outside the representable range.
    DomainError { value: u64 },
    /// Cryptographic cross-check failure: the reconstructed append root
    /// disagrees with the proof's own root.
    InvalidProof,
    /// The proof is structurally incompatible with any valid tree.
    MalformedProof { reason: &'static str },
    /// Canonical byte codec failure.
    Serialization(SerKind),
}

impl fmt::Display for MerkleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MerkleError::EmptyLeaves => write!(f, "no elements supplied"),
            MerkleError::LengthMismatch { expected, got } => {
                write!(f, "length mismatch: expected {}, got {}", expected, got)
            }
            MerkleError::IndexOutOfRange { index, max } => {
                write!(f, "index {} out of range (max {})", index, max)
            }
            MerkleError::DuplicateIndex { index } => {
                write!(f, "duplicate index {}", index)
            }
            MerkleError::UnbalancedLeafCount { count } => {
                write!(f, "leaf count {} is not a power of two", count)
            }
            MerkleError::DomainError { value } => {
                write!(f, "value {} outside the representable range", value)
            }
            MerkleError::InvalidProof => write!(f, "proof cross-check failed"),
            MerkleError::MalformedProof { reason } => {
                write!(f, "malformed proof: {}", reason)
            }
            MerkleError::Serialization(kind) => {
                write!(f, "serialisation error in {:?}", kind)
            }
        }
    }
}

impl std::error::Error for MerkleError {}
