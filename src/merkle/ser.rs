//! Canonical byte layouts for the proof structures.
//!
//! All integers are little-endian. Bit-vectors encode their exact bit
//! length followed by the packed little-endian bytes, so trailing padding
//! bits are unambiguous on decode.

use crate::hash::{Digest, DIGEST_SIZE};
use crate::utils::bits::BitField;

use super::types::{CompactProof, Element, MerkleError, MultiProof, SerKind};

fn encode_bit_field(out: &mut Vec<u8>, field: &BitField) {
    out.extend_from_slice(&(field.len() as u32).to_le_bytes());
    out.extend_from_slice(field.as_raw_bytes());
}

/// Serialises a [`CompactProof`] into the canonical byte layout.
pub fn encode_compact_proof(proof: &CompactProof) -> Result<Vec<u8>, MerkleError> {
    let mut out = Vec::new();
    out.extend_from_slice(&proof.element_count.to_le_bytes());
    encode_bit_field(&mut out, &proof.flags);
    encode_bit_field(&mut out, &proof.skips);
    let count =
        u32::try_from(proof.decommitments.len()).map_err(|_| {
            MerkleError::Serialization(SerKind::CompactProof)
        })?;
    out.extend_from_slice(&count.to_le_bytes());
    for digest in &proof.decommitments {
        out.extend_from_slice(digest.as_bytes());
    }
    Ok(out)
}

/// Deserialises a [`CompactProof`] from its canonical byte representation.
pub fn decode_compact_proof(bytes: &[u8]) -> Result<CompactProof, MerkleError> {
    let mut cursor = 0usize;
    let mut take = |len: usize| -> Result<&[u8], MerkleError> {
        if cursor + len > bytes.len() {
            return Err(MerkleError::Serialization(SerKind::CompactProof));
        }
        let slice = &bytes[cursor..cursor + len];
        cursor += len;
        Ok(slice)
    };

    let mut count_bytes = [0u8; 4];
    count_bytes.copy_from_slice(take(4)?);
    let element_count = u32::from_le_bytes(count_bytes);

    let mut flag_len_bytes = [0u8; 4];
    flag_len_bytes.copy_from_slice(take(4)?);
    let flag_len = u32::from_le_bytes(flag_len_bytes) as usize;
    let flags = BitField::from_bytes(take(flag_len.div_ceil(8))?, flag_len)
        .map_err(|_| MerkleError::Serialization(SerKind::CompactProof))?;

    let mut skip_len_bytes = [0u8; 4];
    skip_len_bytes.copy_from_slice(take(4)?);
    let skip_len = u32::from_le_bytes(skip_len_bytes) as usize;
    let skips = BitField::from_bytes(take(skip_len.div_ceil(8))?, skip_len)
        .map_err(|_| MerkleError::Serialization(SerKind::CompactProof))?;

    let mut decommitment_count_bytes = [0u8; 4];
    decommitment_count_bytes.copy_from_slice(take(4)?);
    let decommitment_count = u32::from_le_bytes(decommitment_count_bytes) as usize;
    let mut decommitments = Vec::with_capacity(decommitment_count);
    for _ in 0..decommitment_count {
        let mut raw = [0u8; DIGEST_SIZE];
        raw.copy_from_slice(take(DIGEST_SIZE)?);
        decommitments.push(Digest::from_bytes(raw));
    }

    Ok(CompactProof {
        element_count,
        flags,
        skips,
        decommitments,
    })
}

/// Serialises a [`MultiProof`] into the canonical byte layout.
pub fn encode_multi_proof(proof: &MultiProof) -> Result<Vec<u8>, MerkleError> {
    if proof.indices.len() != proof.elements.len() {
        return Err(MerkleError::Serialization(SerKind::MultiProof));
    }
    let mut out = Vec::new();
    out.extend_from_slice(proof.mixed_root.as_bytes());
    out.extend_from_slice(proof.root.as_bytes());
    out.extend_from_slice(&proof.leaf_count.to_le_bytes());
    let index_count = u32::try_from(proof.indices.len())
        .map_err(|_| MerkleError::Serialization(SerKind::MultiProof))?;
    out.extend_from_slice(&index_count.to_le_bytes());
    for &index in &proof.indices {
        out.extend_from_slice(&index.to_le_bytes());
    }
    for element in &proof.elements {
        let len = u32::try_from(element.as_bytes().len())
            .map_err(|_| MerkleError::Serialization(SerKind::MultiProof))?;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(element.as_bytes());
    }
    let decommitment_count = u32::try_from(proof.decommitments.len())
        .map_err(|_| MerkleError::Serialization(SerKind::MultiProof))?;
    out.extend_from_slice(&decommitment_count.to_le_bytes());
    for digest in &proof.decommitments {
        out.extend_from_slice(digest.as_bytes());
    }
    Ok(out)
}

/// Deserialises a [`MultiProof`] from its canonical byte representation.
pub fn decode_multi_proof(bytes: &[u8]) -> Result<MultiProof, MerkleError> {
    let mut cursor = 0usize;
    let mut take = |len: usize| -> Result<&[u8], MerkleError> {
        if cursor + len > bytes.len() {
            return Err(MerkleError::Serialization(SerKind::MultiProof));
        }
        let slice = &bytes[cursor..cursor + len];
        cursor += len;
        Ok(slice)
    };

    let mut mixed_root_bytes = [0u8; DIGEST_SIZE];
    mixed_root_bytes.copy_from_slice(take(DIGEST_SIZE)?);
    let mixed_root = Digest::from_bytes(mixed_root_bytes);
    let mut root_bytes = [0u8; DIGEST_SIZE];
    root_bytes.copy_from_slice(take(DIGEST_SIZE)?);
    let root = Digest::from_bytes(root_bytes);
    let mut leaf_count_bytes = [0u8; 4];
    leaf_count_bytes.copy_from_slice(take(4)?);
    let leaf_count = u32::from_le_bytes(leaf_count_bytes);

    let mut index_count_bytes = [0u8; 4];
    index_count_bytes.copy_from_slice(take(4)?);
    let index_count = u32::from_le_bytes(index_count_bytes) as usize;
    let mut indices = Vec::with_capacity(index_count);
    for _ in 0..index_count {
        let mut index_bytes = [0u8; 4];
        index_bytes.copy_from_slice(take(4)?);
        indices.push(u32::from_le_bytes(index_bytes));
    }
    let mut elements = Vec::with_capacity(index_count);
    for _ in 0..index_count {
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(take(4)?);
        let len = u32::from_le_bytes(len_bytes) as usize;
        elements.push(Element::new(take(len)?.to_vec()));
    }

    let mut decommitment_count_bytes = [0u8; 4];
    decommitment_count_bytes.copy_from_slice(take(4)?);
    let decommitment_count = u32::from_le_bytes(decommitment_count_bytes) as usize;
    let mut decommitments = Vec::with_capacity(decommitment_count);
    for _ in 0..decommitment_count {
        let mut raw = [0u8; DIGEST_SIZE];
        raw.copy_from_slice(take(DIGEST_SIZE)?);
        decommitments.push(Digest::from_bytes(raw));
    }

    Ok(MultiProof {
        mixed_root,
        root,
        leaf_count,
        indices,
        elements,
        decommitments,
    })
}
