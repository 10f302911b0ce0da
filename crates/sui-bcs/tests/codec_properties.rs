//! Property tests for the canonical codec.

use proptest::prelude::*;
use sui_bcs::{
    decode_uleb128, encode_uleb128, from_bytes, to_bytes, BString, BcsMap, ByteSequence, Bytes,
    DecodeError, Sequence, U256,
};

proptest! {
    #[test]
    fn prop_uleb128_roundtrip(v in any::<u64>()) {
        let bytes = encode_uleb128(v);
        prop_assert_eq!(decode_uleb128(&bytes).unwrap(), (v, bytes.len()));
    }

    #[test]
    fn prop_truncated_uleb128_never_panics(v in 128u64.., cut in 1usize..10) {
        let bytes = encode_uleb128(v);
        let cut = cut.min(bytes.len() - 1);
        let is_malformed = matches!(
            decode_uleb128(&bytes[..cut]),
            Err(DecodeError::MalformedVarint { .. })
        );
        prop_assert!(is_malformed);
    }

    #[test]
    fn prop_primitives_roundtrip(a in any::<u8>(), b in any::<u16>(), c in any::<u32>(),
                                 d in any::<u64>(), e in any::<u128>(), f in any::<bool>(),
                                 g in any::<[u8; 32]>()) {
        prop_assert_eq!(from_bytes::<u8>(&to_bytes(&a)).unwrap(), a);
        prop_assert_eq!(from_bytes::<u16>(&to_bytes(&b)).unwrap(), b);
        prop_assert_eq!(from_bytes::<u32>(&to_bytes(&c)).unwrap(), c);
        prop_assert_eq!(from_bytes::<u64>(&to_bytes(&d)).unwrap(), d);
        prop_assert_eq!(from_bytes::<u128>(&to_bytes(&e)).unwrap(), e);
        prop_assert_eq!(from_bytes::<bool>(&to_bytes(&f)).unwrap(), f);
        let wide = U256::from_le_bytes(g);
        prop_assert_eq!(from_bytes::<U256>(&to_bytes(&wide)).unwrap(), wide);
    }

    #[test]
    fn prop_containers_roundtrip(blobs in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..8),
                                 text in ".{0,40}",
                                 nums in prop::collection::vec(any::<u64>(), 0..16)) {
        let seq = ByteSequence::new(blobs.clone());
        prop_assert_eq!(from_bytes::<ByteSequence>(&to_bytes(&seq)).unwrap(), seq);

        let framed: Sequence<Bytes> = blobs.into_iter().map(Bytes::new).collect();
        prop_assert_eq!(from_bytes::<Sequence<Bytes>>(&to_bytes(&framed)).unwrap(), framed);

        let s = BString::new(text);
        prop_assert_eq!(from_bytes::<BString>(&to_bytes(&s)).unwrap(), s);

        let nums = Sequence::new(nums);
        prop_assert_eq!(from_bytes::<Sequence<u64>>(&to_bytes(&nums)).unwrap(), nums);
    }

    #[test]
    fn prop_map_encoding_ignores_insertion_order(
        entries in prop::collection::btree_map(".{0,12}", any::<u64>(), 0..24),
        seed in any::<u64>(),
    ) {
        let forward: Vec<(String, u64)> = entries.into_iter().collect();

        // deterministic shuffle driven by the seed
        let mut shuffled = forward.clone();
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            shuffled.swap(i, (state % (i as u64 + 1)) as usize);
        }

        let a: BcsMap<BString, u64> = forward.into_iter().map(|(k, v)| (BString::new(k), v)).collect();
        let b: BcsMap<BString, u64> = shuffled.into_iter().map(|(k, v)| (BString::new(k), v)).collect();
        let bytes = to_bytes(&a);
        prop_assert_eq!(&bytes, &to_bytes(&b));

        let decoded: BcsMap<BString, u64> = from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded, a);
    }
}

#[test]
fn test_uleb128_byte_length_classes() {
    assert_eq!(encode_uleb128(0).len(), 1);
    assert_eq!(encode_uleb128(127).len(), 1);
    assert_eq!(encode_uleb128(128).len(), 2);
    assert_eq!(encode_uleb128((1u64 << 32) - 1).len(), 5);
}
