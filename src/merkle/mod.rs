//! Compact, appendable Merkle multi-proofs.
//!
//! The module fixes the following protocol knobs:
//!
//! * **Leaf layout:** a leaf hash is the digest of a `0x00` tag byte
//!   followed by the raw element bytes. Internal nodes hash the
//!   concatenation of their two children with no tag.
//! * **Pairing:** [`PairingMode`](crate::hash::PairingMode) selects whether
//!   children keep their positional order or are sorted byte-wise before
//!   hashing. The mixed root always preserves order.
//! * **Proof shapes:** flag/skip proofs ([`CompactProof`],
//!   [`BooleanProof`]) cover arbitrary unbalanced trees and double as
//!   append proofs; index-based proofs ([`MultiProof`]) cover balanced
//!   trees built through [`BalancedTree`].
//!
//! The public API re-exports the most relevant types for convenience.

mod append;
mod balanced;
mod decoder;
mod index;
mod ring;
mod ser;
mod types;

pub use append::append_root;
pub use balanced::{verify_multi_proof, BalancedTree};
pub use decoder::{
    get_new_root_bits, get_new_root_booleans, get_root_bits, get_root_booleans,
};
pub use index::minimum_index;
pub use ser::{
    decode_compact_proof, decode_multi_proof, encode_compact_proof, encode_multi_proof,
};
pub use types::{
    BooleanProof, CompactProof, Element, MerkleError, MultiProof, RootInference, RootUpdate,
    SerKind,
};
