//! Cross-checks against the reference `bcs` crate.
//!
//! Scalars, blobs, strings, options and maps have a single canonical layout,
//! so our bytes must match the reference implementation exactly. `Sequence`
//! is deliberately absent: it frames each element and has no counterpart.

use std::collections::BTreeMap;

use sui_bcs::{to_bytes, BString, BcsMap, ByteSequence, Bytes, U256};

#[test]
fn test_fixed_width_integers_match_reference() {
    assert_eq!(to_bytes(&0xabu8), bcs::to_bytes(&0xabu8).unwrap());
    assert_eq!(to_bytes(&0xabcdu16), bcs::to_bytes(&0xabcdu16).unwrap());
    assert_eq!(to_bytes(&0xdead_beefu32), bcs::to_bytes(&0xdead_beefu32).unwrap());
    assert_eq!(to_bytes(&u64::MAX), bcs::to_bytes(&u64::MAX).unwrap());
    assert_eq!(to_bytes(&(1u128 << 90)), bcs::to_bytes(&(1u128 << 90)).unwrap());
    assert_eq!(to_bytes(&true), bcs::to_bytes(&true).unwrap());
}

#[test]
fn test_u256_matches_32_byte_array() {
    let value = U256::from(0x0102_0304u64);
    let raw = value.to_le_bytes();
    assert_eq!(to_bytes(&value), bcs::to_bytes(&raw).unwrap());
}

#[test]
fn test_length_prefixes_match_reference() {
    for len in [0usize, 1, 127, 128, 300, 16_384] {
        let blob = vec![7u8; len];
        assert_eq!(
            to_bytes(&Bytes::new(blob.clone())),
            bcs::to_bytes(&blob).unwrap(),
            "blob of length {}",
            len
        );
    }
}

#[test]
fn test_strings_and_options_match_reference() {
    let s = "0x2::coin::Coin";
    assert_eq!(to_bytes(&BString::from(s)), bcs::to_bytes(&s).unwrap());
    assert_eq!(to_bytes(&Some(9u64)), bcs::to_bytes(&Some(9u64)).unwrap());
    assert_eq!(to_bytes(&None::<u64>), bcs::to_bytes(&None::<u64>).unwrap());
}

#[test]
fn test_byte_sequence_matches_nested_vectors() {
    let modules = vec![vec![0xa1, 0x1c, 0xeb, 0x0b], vec![], vec![1, 2, 3]];
    assert_eq!(
        to_bytes(&ByteSequence::new(modules.clone())),
        bcs::to_bytes(&modules).unwrap()
    );
}

#[test]
fn test_map_matches_reference_btreemap() {
    let entries = [
        (vec![3u8, 4], 40u64),
        (vec![1u8], 10),
        (vec![2u8, 0, 0], 20),
        (vec![], 0),
    ];

    let ours: BcsMap<Bytes, u64> = entries
        .iter()
        .rev()
        .map(|(k, v)| (Bytes::new(k.clone()), *v))
        .collect();
    let reference: BTreeMap<Vec<u8>, u64> = entries.iter().cloned().collect();

    assert_eq!(to_bytes(&ours), bcs::to_bytes(&reference).unwrap());
}
