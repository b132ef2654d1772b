use bitvec::order::Lsb0;
use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};

use crate::hash::DIGEST_SIZE;
use crate::merkle::MerkleError;

/// Fixed-width big-endian encoding of an element count, sized to a digest.
///
/// Used when a count participates in a hash input, most notably the mixed
/// root commitment. Total for `u32`: every count fits the 32-byte width.
pub fn encode_count(count: u32) -> [u8; DIGEST_SIZE] {
    let mut out = [0u8; DIGEST_SIZE];
    out[DIGEST_SIZE - 4..].copy_from_slice(&count.to_be_bytes());
    out
}

/// Number of set bits in a 32-bit count.
///
/// This is the number of complete subtrees an unbalanced tree decomposes
/// into, and therefore the length of every append-decommitment list.
pub fn bit_count32(value: u32) -> u32 {
    value.count_ones()
}

/// Smallest power of two greater than or equal to `value`.
///
/// `round_up_pow2(0)` is 1. Counts above `2^31` have no representable
/// rounding and fail with [`MerkleError::DomainError`].
pub fn round_up_pow2(value: u32) -> Result<u32, MerkleError> {
    if value == 0 {
        return Ok(1);
    }
    value
        .checked_next_power_of_two()
        .ok_or(MerkleError::DomainError {
            value: value as u64,
        })
}

/// Packed bit-vector with little-endian bit order: bit 0 is the least
/// significant bit of the first byte.
///
/// This is the wire representation of the `flags` and `skips` sequences of
/// compact proofs. Reads past the end zero-extend, matching the semantics
/// of testing a shifted one-bit mask against a fixed-width word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitField {
    bits: BitVec<u8, Lsb0>,
}

impl BitField {
    /// Creates an empty bit-field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bit-field from a boolean slice, index-aligned.
    pub fn from_bools(values: &[bool]) -> Self {
        let mut bits = BitVec::with_capacity(values.len());
        for &value in values {
            bits.push(value);
        }
        Self { bits }
    }

    /// Reconstructs a bit-field from packed bytes and an explicit bit length.
    ///
    /// `bit_len` may leave padding bits unused in the final byte but cannot
    /// exceed the supplied storage.
    pub fn from_bytes(bytes: &[u8], bit_len: usize) -> Result<Self, MerkleError> {
        if bit_len > bytes.len() * 8 {
            return Err(MerkleError::LengthMismatch {
                expected: bit_len.div_ceil(8),
                got: bytes.len(),
            });
        }
        let mut bits = BitVec::<u8, Lsb0>::from_slice(bytes);
        bits.truncate(bit_len);
        Ok(Self { bits })
    }

    /// Returns the bit at `index`, zero-extending past the end.
    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).map(|bit| *bit).unwrap_or(false)
    }

    /// Sets the bit at `index`, growing the field with zeros if needed.
    pub fn set(&mut self, index: usize, value: bool) {
        if index >= self.bits.len() {
            self.bits.resize(index + 1, false);
        }
        self.bits.set(index, value);
    }

    /// Appends a bit at the end.
    pub fn push(&mut self, value: bool) {
        self.bits.push(value);
    }

    /// Number of bits stored.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the field holds no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Packed byte representation, little-endian bit order.
    pub fn as_raw_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }
}
