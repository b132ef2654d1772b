
use _fixtures::{all_indices, elements, select, to_compact, ReferenceTree, H};
use compact_merkle::{
    get_new_root_bits, get_new_root_booleans, get_root_bits, get_root_booleans, minimum_index,
    Element, MerkleError, PairingMode,
};
use proptest::prelude::*;

#[test]
fn full_inclusion_reconstructs_root_and_basis() {
    for count in 1u32..=12 {
        let all = elements(count as usize);
        let tree = ReferenceTree::build(&all, PairingMode::Preserved);
        let indices = all_indices(count);
        let proof = tree.flag_proof(&indices);
        let claimed = select(&all, &indices);
        let inference =
            get_root_booleans::<H>(&claimed, &proof, PairingMode::Preserved).unwrap();
        assert_eq!(inference.root, tree.root(), "count {count}");
        assert_eq!(
            inference.append_decommitments,
            Some(tree.append_basis()),
            "count {count}"
        );
    }
}

#[test]
fn packed_bits_agree_with_booleans() {
    for count in 1u32..=12 {
        let all = elements(count as usize);
        let tree = ReferenceTree::build(&all, PairingMode::Preserved);
        let indices = all_indices(count);
        let claimed = select(&all, &indices);
        let boolean = tree.flag_proof(&indices);
        let compact = to_compact(&boolean);
        let from_booleans =
            get_root_booleans::<H>(&claimed, &boolean, PairingMode::Preserved).unwrap();
        let from_bits = get_root_bits::<H>(&claimed, &compact, PairingMode::Preserved).unwrap();
        assert_eq!(from_booleans, from_bits);
    }
}

#[test]
fn subset_proofs_reconstruct_root_under_sorted_pairing() {
    let cases: &[(u32, &[u32])] = &[
        (3, &[0]),
        (4, &[1]),
        (4, &[3, 2, 1, 0]),
        (5, &[4, 2]),
        (6, &[5, 1]),
        (7, &[6, 3, 0]),
        (9, &[8]),
        (11, &[10, 7, 2]),
    ];
    for &(count, indices) in cases {
        let all = elements(count as usize);
        let tree = ReferenceTree::build(&all, PairingMode::Sorted);
        let proof = tree.flag_proof(indices);
        let claimed = select(&all, indices);
        let inference = get_root_booleans::<H>(&claimed, &proof, PairingMode::Sorted).unwrap();
        assert_eq!(inference.root, tree.root(), "count {count}, {indices:?}");
    }
}

#[test]
fn proofs_anchoring_the_boundary_yield_the_basis() {
    for count in 2u32..=12 {
        let all = elements(count as usize);
        let tree = ReferenceTree::build(&all, PairingMode::Sorted);
        let indices = [count - 1];
        let proof = tree.flag_proof(&indices);
        let claimed = select(&all, &indices);
        let inference = get_root_booleans::<H>(&claimed, &proof, PairingMode::Sorted).unwrap();
        assert!(indices[0] >= minimum_index(count));
        assert_eq!(
            inference.append_decommitments,
            Some(tree.append_basis()),
            "count {count}"
        );
    }
}

#[test]
fn unanchored_proofs_yield_no_basis() {
    // 6 = 0b110: the boundary sits at index 4, a proof of index 1 never
    // touches it.
    let all = elements(6);
    let tree = ReferenceTree::build(&all, PairingMode::Sorted);
    let proof = tree.flag_proof(&[1]);
    let claimed = select(&all, &[1]);
    let inference = get_root_booleans::<H>(&claimed, &proof, PairingMode::Sorted).unwrap();
    assert_eq!(inference.root, tree.root());
    assert_eq!(inference.append_decommitments, None);
}

#[test]
fn power_of_two_counts_always_yield_the_root_basis() {
    let all = elements(8);
    let tree = ReferenceTree::build(&all, PairingMode::Sorted);
    let proof = tree.flag_proof(&[2]);
    let claimed = select(&all, &[2]);
    let inference = get_root_booleans::<H>(&claimed, &proof, PairingMode::Sorted).unwrap();
    assert_eq!(inference.append_decommitments, Some(vec![tree.root()]));
}

#[test]
fn empty_element_list_is_rejected() {
    let tree = ReferenceTree::build(&elements(4), PairingMode::Preserved);
    let proof = tree.flag_proof(&all_indices(4));
    let err = get_root_booleans::<H>(&[], &proof, PairingMode::Preserved).unwrap_err();
    assert!(matches!(err, MerkleError::EmptyLeaves));
}

#[test]
fn mismatched_flag_and_skip_lengths_are_rejected() {
    let all = elements(3);
    let tree = ReferenceTree::build(&all, PairingMode::Preserved);
    let mut proof = tree.flag_proof(&all_indices(3));
    proof.skips.pop();
    let claimed = select(&all, &all_indices(3));
    let err = get_root_booleans::<H>(&claimed, &proof, PairingMode::Preserved).unwrap_err();
    assert!(matches!(err, MerkleError::LengthMismatch { .. }));
}

#[test]
fn truncated_decommitments_are_malformed() {
    let all = elements(6);
    let tree = ReferenceTree::build(&all, PairingMode::Sorted);
    let mut proof = tree.flag_proof(&[5, 1]);
    proof.decommitments.pop();
    let claimed = select(&all, &[5, 1]);
    let err = get_root_booleans::<H>(&claimed, &proof, PairingMode::Sorted).unwrap_err();
    assert!(matches!(err, MerkleError::MalformedProof { .. }));
}

#[test]
fn completed_basis_disagreeing_with_the_root_is_invalid() {
    // Under preserved pairing a left-sibling decommitment is still consumed
    // as the right operand, so the reconstruction and the accumulated
    // append chain land on different digests while every basis slot fills.
    let all = elements(6);
    let tree = ReferenceTree::build(&all, PairingMode::Preserved);
    let proof = tree.flag_proof(&[5]);
    let claimed = select(&all, &[5]);
    let err = get_root_booleans::<H>(&claimed, &proof, PairingMode::Preserved).unwrap_err();
    assert!(matches!(err, MerkleError::InvalidProof));
}

#[test]
fn update_without_append_keeps_the_count() {
    let all = elements(6);
    let tree = ReferenceTree::build(&all, PairingMode::Sorted);
    let indices = [5u32, 1];
    let proof = tree.flag_proof(&indices);
    let claimed = select(&all, &indices);
    let updated: Vec<Element> = claimed
        .iter()
        .map(|element| {
            let mut bytes = element.as_bytes().to_vec();
            bytes.extend_from_slice(b"-updated");
            Element::new(bytes)
        })
        .collect();

    let update =
        get_new_root_booleans::<H>(&claimed, &updated, &[], &proof, PairingMode::Sorted).unwrap();
    assert_eq!(update.root, tree.root());
    assert_eq!(update.new_element_count, 6);

    let mut new_all = all.clone();
    for (&index, element) in indices.iter().zip(updated.iter()) {
        new_all[index as usize] = element.clone();
    }
    let new_tree = ReferenceTree::build(&new_all, PairingMode::Sorted);
    assert_eq!(update.new_root, new_tree.root());
}

#[test]
fn no_op_update_returns_the_old_root() {
    let all = elements(5);
    let tree = ReferenceTree::build(&all, PairingMode::Sorted);
    let indices = [4u32, 2];
    let proof = tree.flag_proof(&indices);
    let claimed = select(&all, &indices);
    let update =
        get_new_root_booleans::<H>(&claimed, &claimed, &[], &proof, PairingMode::Sorted).unwrap();
    assert_eq!(update.root, tree.root());
    assert_eq!(update.new_root, tree.root());
    assert_eq!(update.new_element_count, 5);
}

#[test]
fn update_and_append_matches_a_rebuilt_tree() {
    for (count, appended_count) in [(3usize, 2usize), (4, 1), (5, 3), (6, 2), (8, 5)] {
        let all = elements(count);
        let tree = ReferenceTree::build(&all, PairingMode::Sorted);
        let indices = [count as u32 - 1];
        let proof = tree.flag_proof(&indices);
        let claimed = select(&all, &indices);
        let updated: Vec<Element> = claimed
            .iter()
            .map(|element| {
                let mut bytes = element.as_bytes().to_vec();
                bytes.extend_from_slice(b"!");
                Element::new(bytes)
            })
            .collect();
        let appended: Vec<Element> = (0..appended_count)
            .map(|i| Element::new(format!("appended-{i}").into_bytes()))
            .collect();

        let update =
            get_new_root_booleans::<H>(&claimed, &updated, &appended, &proof, PairingMode::Sorted)
                .unwrap();
        assert_eq!(update.root, tree.root());
        assert_eq!(update.new_element_count, (count + appended_count) as u32);

        let mut new_all = all.clone();
        for (&index, element) in indices.iter().zip(updated.iter()) {
            new_all[index as usize] = element.clone();
        }
        new_all.extend(appended.iter().cloned());
        let new_tree = ReferenceTree::build(&new_all, PairingMode::Sorted);
        assert_eq!(
            update.new_root,
            new_tree.root(),
            "count {count}, appended {appended_count}"
        );
    }
}

#[test]
fn append_through_an_unanchored_proof_is_malformed() {
    let all = elements(6);
    let tree = ReferenceTree::build(&all, PairingMode::Sorted);
    let proof = tree.flag_proof(&[1]);
    let claimed = select(&all, &[1]);
    let appended = [Element::new(b"tail".to_vec())];
    let err = get_new_root_booleans::<H>(&claimed, &claimed, &appended, &proof, PairingMode::Sorted)
        .unwrap_err();
    assert!(matches!(err, MerkleError::MalformedProof { .. }));
}

#[test]
fn update_variants_agree_on_packed_bits() {
    let all = elements(5);
    let tree = ReferenceTree::build(&all, PairingMode::Sorted);
    let indices = [4u32, 2];
    let boolean = tree.flag_proof(&indices);
    let compact = to_compact(&boolean);
    let claimed = select(&all, &indices);
    let appended = [Element::new(b"extra".to_vec())];

    let from_booleans =
        get_new_root_booleans::<H>(&claimed, &claimed, &appended, &boolean, PairingMode::Sorted)
            .unwrap();
    let from_bits =
        get_new_root_bits::<H>(&claimed, &claimed, &appended, &compact, PairingMode::Sorted)
            .unwrap();
    assert_eq!(from_booleans, from_bits);
}

proptest! {
    #[test]
    fn random_subsets_reconstruct_the_root(
        count in 1u32..40,
        seed in any::<u64>(),
    ) {
        let all = elements(count as usize);
        let tree = ReferenceTree::build(&all, PairingMode::Sorted);
        // Deterministic pseudo-random subset from the seed.
        let mut indices: Vec<u32> = (0..count)
            .filter(|index| (seed >> (index % 64)) & 1 == 1)
            .collect();
        if indices.is_empty() {
            indices.push(count - 1);
        }
        indices.sort_unstable_by(|a, b| b.cmp(a));
        let proof = tree.flag_proof(&indices);
        let claimed = select(&all, &indices);
        let inference = get_root_booleans::<H>(&claimed, &proof, PairingMode::Sorted).unwrap();
        prop_assert_eq!(inference.root, tree.root());
    }
}
