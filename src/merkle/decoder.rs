//! Flag/skip proof interpreter.
//!
//! A flag-based proof describes, as a flat step sequence, the unique order
//! of pairwise combinations that reduces a set of claimed leaves to the
//! tree root. Each step either combines two hashes (`skip` clear) or
//! carries a lone hash up one level (`skip` set, the unbalanced-boundary
//! case). For a combining step the `flag` selects where the right operand
//! comes from: a previously produced hash, or the next external
//! decommitment. Leaves are supplied in descending index order.
//!
//! While reducing, the interpreter tracks the position a freshly appended
//! element would attach to at every level. Whenever that position is odd,
//! the combination at the level's right edge joins the root of a complete
//! subtree with the chain of nodes adjacent to the append position; the
//! subtree root is one entry of the append basis, the decommitment list
//! needed to extend the tree without a full proof. The basis is
//! accumulated back-to-front and cross-checked against the reconstructed
//! root before it is returned.

use crate::hash::{combine, hash_leaf, Digest, MerkleHasher, PairingMode};
use crate::utils::bits::{bit_count32, BitField};

use super::append::append_root;
use super::ring::{HashRing, RingCursors};
use super::types::{
    BooleanProof, CompactProof, Element, MerkleError, RootInference, RootUpdate,
};

/// One interpreter step, decoded from the flag/skip pair at a position.
#[derive(Clone, Copy, Debug)]
struct Step {
    flag: bool,
    skip: bool,
}

fn boolean_steps(flags: &[bool], skips: &[bool]) -> Result<Vec<Step>, MerkleError> {
    if flags.len() != skips.len() {
        return Err(MerkleError::LengthMismatch {
            expected: flags.len(),
            got: skips.len(),
        });
    }
    Ok(flags
        .iter()
        .zip(skips.iter())
        .map(|(&flag, &skip)| Step { flag, skip })
        .collect())
}

/// Decodes packed steps up to the `flag && skip` end-of-proof sentinel.
fn bit_steps(flags: &BitField, skips: &BitField) -> Result<Vec<Step>, MerkleError> {
    if flags.len() != skips.len() {
        return Err(MerkleError::LengthMismatch {
            expected: flags.len(),
            got: skips.len(),
        });
    }
    let mut steps = Vec::with_capacity(flags.len());
    for position in 0..flags.len() {
        let flag = flags.get(position);
        let skip = skips.get(position);
        if flag && skip {
            return Ok(steps);
        }
        steps.push(Step { flag, skip });
    }
    Err(MerkleError::MalformedProof {
        reason: "missing end-of-proof sentinel",
    })
}

/// Per-traversal value state. Cursor bookkeeping lives outside so an
/// update derivation can run an old-value lane and a new-value lane in
/// lockstep over identical positions.
struct Lane {
    leaves: Vec<Digest>,
    ring: HashRing,
    append_hash: Option<Digest>,
    append_slots: Vec<Option<Digest>>,
    append_cursor: usize,
    inference_ok: bool,
}

impl Lane {
    fn new(leaves: Vec<Digest>, element_count: u32) -> Self {
        let capacity = leaves.len();
        let basis_len = bit_count32(element_count) as usize;
        Self {
            leaves,
            ring: HashRing::new(capacity),
            append_hash: None,
            append_slots: vec![None; basis_len],
            append_cursor: basis_len,
            inference_ok: true,
        }
    }

    fn fetch(&self, source: (usize, bool)) -> Result<Digest, MerkleError> {
        let (slot, from_leaves) = source;
        if from_leaves {
            Ok(self.leaves[slot])
        } else {
            self.ring.get(slot)
        }
    }

    /// Records one append-basis entry, back-to-front.
    fn record_append(&mut self, value: Digest) {
        if !self.inference_ok {
            return;
        }
        if self.append_cursor == 0 {
            self.inference_ok = false;
            return;
        }
        self.append_cursor -= 1;
        self.append_slots[self.append_cursor] = Some(value);
    }
}

/// Runs the step sequence over every lane, returning the slot of the last
/// hash written, or `None` when the proof needed no combination at all.
fn run_lanes<H: MerkleHasher>(
    lanes: &mut [Lane],
    element_count: u32,
    steps: &[Step],
    decommitments: &[Digest],
    mode: PairingMode,
) -> Result<Option<usize>, MerkleError> {
    let capacity = lanes[0].leaves.len();
    let mut cursors = RingCursors::new(capacity);
    let mut decommitment_index = 0usize;
    let mut append_node_index = element_count;
    // Slot holding the right-most node of the level currently being read.
    let mut marker = 0usize;
    let mut last_written = None;

    for step in steps {
        if step.skip {
            let source = cursors.read_source();
            let write_slot = cursors.write_slot();
            for lane in lanes.iter_mut() {
                let value = lane.fetch(source)?;
                if append_node_index & 1 == 1 {
                    lane.record_append(value);
                    lane.append_hash = Some(value);
                }
                lane.ring.put(write_slot, value);
            }
            marker = write_slot;
            append_node_index >>= 1;
            last_written = Some(write_slot);
            cursors.advance_read();
            cursors.advance_write();
            continue;
        }

        let at_boundary = cursors.read_slot() == marker;

        let right_source = if step.flag {
            let source = cursors.read_source();
            cursors.advance_read();
            Some(source)
        } else {
            None
        };
        let external = match right_source {
            Some(_) => None,
            None => {
                let digest = *decommitments.get(decommitment_index).ok_or(
                    MerkleError::MalformedProof {
                        reason: "decommitments exhausted",
                    },
                )?;
                decommitment_index += 1;
                Some(digest)
            }
        };
        let left_source = cursors.read_source();
        cursors.advance_read();

        let write_slot = cursors.write_slot();
        for lane in lanes.iter_mut() {
            let right = match (right_source, external) {
                (Some(source), _) => lane.fetch(source)?,
                (None, Some(digest)) => digest,
                (None, None) => unreachable!("combine step has exactly one right source"),
            };
            let left = lane.fetch(left_source)?;
            if at_boundary && append_node_index & 1 == 1 {
                // One operand continues the accumulated append-adjacent
                // chain; the other is a complete-subtree root and therefore
                // a basis entry. The chain operand is recognised by value.
                let entry = match lane.append_hash {
                    Some(accumulated) if right == accumulated => Some((left, accumulated)),
                    Some(accumulated) if left == accumulated => Some((right, accumulated)),
                    _ => None,
                };
                match entry {
                    Some((entry, accumulated)) => {
                        lane.record_append(entry);
                        lane.append_hash = Some(combine::<H>(&entry, &accumulated, mode));
                    }
                    None => lane.inference_ok = false,
                }
            }
            lane.ring.put(write_slot, combine::<H>(&left, &right, mode));
        }
        if at_boundary {
            marker = write_slot;
            append_node_index >>= 1;
        }
        last_written = Some(write_slot);
        cursors.advance_write();
    }

    Ok(last_written)
}

fn leaf_digests<H: MerkleHasher>(elements: &[Element]) -> Result<Vec<Digest>, MerkleError> {
    if elements.is_empty() {
        return Err(MerkleError::EmptyLeaves);
    }
    Ok(elements
        .iter()
        .map(|element| hash_leaf::<H>(element.as_bytes()))
        .collect())
}

fn lane_root(lane: &Lane, last_written: Option<usize>) -> Result<Digest, MerkleError> {
    match last_written {
        Some(slot) => lane.ring.get(slot),
        // No combination ever ran: the sole leaf is the root.
        None => Ok(lane.leaves[0]),
    }
}

/// Resolves a lane's append inference against its reconstructed root.
///
/// A single-entry basis (power-of-two tree) is always the root itself. A
/// multi-entry basis is returned only when every slot was filled and the
/// independently accumulated append root agrees with the tree root; a
/// completed basis that disagrees is an invalid proof.
fn resolve_inference(
    lane: Lane,
    root: Digest,
    element_count: u32,
) -> Result<Option<Vec<Digest>>, MerkleError> {
    let expected = bit_count32(element_count) as usize;
    if expected == 0 {
        return Ok(None);
    }
    if expected == 1 {
        return Ok(Some(vec![root]));
    }
    if !lane.inference_ok || lane.append_cursor != 0 {
        return Ok(None);
    }
    let mut basis = Vec::with_capacity(expected);
    for slot in lane.append_slots {
        match slot {
            Some(digest) => basis.push(digest),
            None => return Ok(None),
        }
    }
    match lane.append_hash {
        Some(accumulated) if accumulated == root => Ok(Some(basis)),
        Some(_) => Err(MerkleError::InvalidProof),
        None => Ok(None),
    }
}

fn run_single<H: MerkleHasher>(
    elements: &[Element],
    element_count: u32,
    steps: &[Step],
    decommitments: &[Digest],
    mode: PairingMode,
) -> Result<RootInference, MerkleError> {
    let leaves = leaf_digests::<H>(elements)?;
    let mut lanes = [Lane::new(leaves, element_count)];
    let last_written = run_lanes::<H>(&mut lanes, element_count, steps, decommitments, mode)?;
    let [lane] = lanes;
    let root = lane_root(&lane, last_written)?;
    let append_decommitments = resolve_inference(lane, root, element_count)?;
    Ok(RootInference {
        root,
        append_decommitments,
    })
}

fn run_update<H: MerkleHasher>(
    elements: &[Element],
    updated_elements: &[Element],
    appended_elements: &[Element],
    element_count: u32,
    steps: &[Step],
    decommitments: &[Digest],
    mode: PairingMode,
) -> Result<RootUpdate, MerkleError> {
    if updated_elements.len() != elements.len() {
        return Err(MerkleError::LengthMismatch {
            expected: elements.len(),
            got: updated_elements.len(),
        });
    }
    let old_leaves = leaf_digests::<H>(elements)?;
    let new_leaves = leaf_digests::<H>(updated_elements)?;
    let mut lanes = [
        Lane::new(old_leaves, element_count),
        Lane::new(new_leaves, element_count),
    ];
    let last_written = run_lanes::<H>(&mut lanes, element_count, steps, decommitments, mode)?;
    let [old_lane, new_lane] = lanes;

    let root = lane_root(&old_lane, last_written)?;
    resolve_inference(old_lane, root, element_count)?;

    let updated_root = lane_root(&new_lane, last_written)?;
    let new_basis = resolve_inference(new_lane, updated_root, element_count)?;

    let appended_count =
        u32::try_from(appended_elements.len()).map_err(|_| MerkleError::DomainError {
            value: appended_elements.len() as u64,
        })?;
    let new_element_count =
        element_count
            .checked_add(appended_count)
            .ok_or(MerkleError::DomainError {
                value: appended_count as u64,
            })?;

    let new_root = if appended_elements.is_empty() {
        updated_root
    } else {
        let basis = new_basis.ok_or(MerkleError::MalformedProof {
            reason: "proof does not anchor the append boundary",
        })?;
        let appended_leaves = leaf_digests::<H>(appended_elements)?;
        append_root::<H>(element_count, &basis, &appended_leaves, mode)?
    };

    Ok(RootUpdate {
        root,
        new_root,
        new_element_count,
    })
}

/// Reconstructs the root (and append basis) from a boolean-array proof.
pub fn get_root_booleans<H: MerkleHasher>(
    elements: &[Element],
    proof: &BooleanProof,
    mode: PairingMode,
) -> Result<RootInference, MerkleError> {
    let steps = boolean_steps(&proof.flags, &proof.skips)?;
    run_single::<H>(
        elements,
        proof.element_count,
        &steps,
        &proof.decommitments,
        mode,
    )
}

/// Reconstructs the root (and append basis) from a packed-bit proof.
pub fn get_root_bits<H: MerkleHasher>(
    elements: &[Element],
    proof: &CompactProof,
    mode: PairingMode,
) -> Result<RootInference, MerkleError> {
    let steps = bit_steps(&proof.flags, &proof.skips)?;
    run_single::<H>(
        elements,
        proof.element_count,
        &steps,
        &proof.decommitments,
        mode,
    )
}

/// Derives the roots before and after replacing the claimed elements with
/// `updated_elements` and appending `appended_elements`, from a
/// boolean-array proof.
///
/// The returned old root must be validated by the caller against its known
/// commitment before the new root is trusted.
pub fn get_new_root_booleans<H: MerkleHasher>(
    elements: &[Element],
    updated_elements: &[Element],
    appended_elements: &[Element],
    proof: &BooleanProof,
    mode: PairingMode,
) -> Result<RootUpdate, MerkleError> {
    let steps = boolean_steps(&proof.flags, &proof.skips)?;
    run_update::<H>(
        elements,
        updated_elements,
        appended_elements,
        proof.element_count,
        &steps,
        &proof.decommitments,
        mode,
    )
}

/// Packed-bit form of [`get_new_root_booleans`].
pub fn get_new_root_bits<H: MerkleHasher>(
    elements: &[Element],
    updated_elements: &[Element],
    appended_elements: &[Element],
    proof: &CompactProof,
    mode: PairingMode,
) -> Result<RootUpdate, MerkleError> {
    let steps = bit_steps(&proof.flags, &proof.skips)?;
    run_update::<H>(
        elements,
        updated_elements,
        appended_elements,
        proof.element_count,
        &steps,
        &proof.decommitments,
        mode,
    )
}
