//! Property-based tests for HAFF compression.
//!
//! These tests verify that compression properties hold across a wide range of inputs:
//! - Any byte sequence survives compress/decompress unchanged
//! - Derived code tables are prefix-free and rebuild an equivalent tree
//! - Container sizes agree with the reported statistics
//!
//! Run with: cargo test -p haff --test proptest_roundtrip

use std::io::Cursor;

use proptest::prelude::*;

use haff::{
    Compressor, Decompressor, FrequencyTable, HaffCodec, HuffmanTree, PriorityQueue, MAGIC,
};

/// Arbitrary bytes, including empty input.
fn bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..2048)
}

/// Bytes drawn from a small alphabet, giving skewed frequencies and short codes.
fn small_alphabet_strategy() -> impl Strategy<Value = Vec<u8>> {
    (1usize..6).prop_flat_map(|alphabet| {
        prop::collection::vec((0..alphabet).prop_map(|i| b'a' + i as u8), 1..1024)
    })
}

/// Runs of one byte repeated, the single-leaf case.
fn single_symbol_strategy() -> impl Strategy<Value = Vec<u8>> {
    (any::<u8>(), 1usize..512).prop_map(|(byte, len)| vec![byte; len])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    })]

    /// Property: decompress(compress(data)) == data.
    #[test]
    fn prop_roundtrip(data in bytes_strategy()) {
        let codec = HaffCodec::new();
        let compressed = codec.compress(&data).unwrap();
        prop_assert_eq!(&compressed[..4], &MAGIC[..]);
        let decompressed = codec.decompress(&compressed).unwrap();
        prop_assert_eq!(decompressed, data);
    }

    /// Property: skewed inputs round-trip too.
    #[test]
    fn prop_roundtrip_small_alphabet(data in small_alphabet_strategy()) {
        let codec = HaffCodec::new();
        let decompressed = codec.decompress(&codec.compress(&data).unwrap()).unwrap();
        prop_assert_eq!(decompressed, data);
    }

    /// Property: a single repeated byte gets the one-bit code "0".
    #[test]
    fn prop_single_symbol(data in single_symbol_strategy()) {
        let tree = HuffmanTree::from_data(&data).unwrap();
        prop_assert_eq!(tree.code(data[0]).to_string(), "0");
        let codec = HaffCodec::new();
        prop_assert_eq!(codec.decompress(&codec.compress(&data).unwrap()).unwrap(), data);
    }

    /// Property: two or more distinct symbols give a prefix-free table.
    #[test]
    fn prop_table_prefix_free(data in bytes_strategy()) {
        let tree = HuffmanTree::from_data(&data).unwrap();
        prop_assert!(tree.code_table().is_prefix_free());
        prop_assert_eq!(tree.leaf_count(), FrequencyTable::from_bytes(&data).used());
    }

    /// Property: a tree rebuilt from the derived table decodes the payload.
    #[test]
    fn prop_rebuilt_tree_decodes(data in bytes_strategy()) {
        let tree = HuffmanTree::from_data(&data).unwrap();
        let (payload, padding) = tree.encode_to_vec(&data).unwrap();
        let rebuilt = HuffmanTree::from_code_table(tree.code_table().clone()).unwrap();
        prop_assert_eq!(rebuilt.decode_slice(&payload, padding).unwrap(), data);
    }

    /// Property: the payload is never longer than the entropy bound plus one bit per symbol.
    #[test]
    fn prop_payload_near_entropy(data in small_alphabet_strategy()) {
        let frequencies = FrequencyTable::from_bytes(&data);
        let tree = HuffmanTree::from_frequencies(&frequencies).unwrap();
        let bits = tree.code_table().encoded_bits(&frequencies) as f64;
        let bound = (frequencies.entropy() + 1.0) * data.len() as f64;
        prop_assert!(bits <= bound + 1e-6, "{} bits exceeds bound {}", bits, bound);
    }

    /// Property: reported stats describe the container that was written.
    #[test]
    fn prop_stats_match_container(data in bytes_strategy()) {
        let codec = HaffCodec::new();
        let mut container = Vec::new();
        let stats = codec.compress_stream(&mut Cursor::new(&data), &mut container).unwrap();
        prop_assert_eq!(stats.original_size, data.len());
        prop_assert_eq!(stats.compressed_size, container.len());
        prop_assert!(stats.padding_bits < 8);
        prop_assert_eq!((stats.payload_bits + u64::from(stats.padding_bits)) % 8, 0);
        prop_assert!(container.len() <= codec.max_compressed_size(data.len()));
    }

    /// Property: successive pops never decrease.
    #[test]
    fn prop_queue_pops_sorted(values in prop::collection::vec(any::<u32>(), 0..256)) {
        let mut queue: PriorityQueue<u32> = values.iter().copied().collect();
        let mut previous = None;
        while let Ok(value) = queue.pop() {
            if let Some(previous) = previous {
                prop_assert!(previous <= value);
            }
            previous = Some(value);
        }
    }

    /// Property: corrupting the payload never panics.
    #[test]
    fn prop_corruption_does_not_panic(
        data in prop::collection::vec(any::<u8>(), 1..512),
        flip in any::<prop::sample::Index>(),
    ) {
        let codec = HaffCodec::new();
        let mut compressed = codec.compress(&data).unwrap();
        let at = flip.index(compressed.len());
        compressed[at] ^= 0x5A;
        let _ = codec.decompress(&compressed);
    }
}
