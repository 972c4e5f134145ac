//! # HAFF
//!
//! Canonical-Huffman byte-stream compressor with a self-describing container.
//!
//! Compression scans the whole input once to count byte frequencies, builds
//! a Huffman tree, then writes the code table followed by the packed
//! payload. Decompression rebuilds the tree from the stored code table and
//! walks it bit by bit.
//!
//! ## Quick Start
//!
//! ```
//! use haff::{Compressor, Decompressor, HaffCodec};
//!
//! let codec = HaffCodec::new();
//! let compressed = codec.compress(b"abracadabra").unwrap();
//! assert_eq!(&compressed[..4], b"HAFF");
//! assert_eq!(codec.decompress(&compressed).unwrap(), b"abracadabra");
//! ```
//!
//! Files go through [`compress`] and [`decompress`]:
//!
//! ```ignore
//! let stats = haff::compress("input.bin", "input.bin.haff")?;
//! println!("{:.2}x", stats.ratio().ratio());
//! haff::decompress("input.bin.haff", "roundtrip.bin")?;
//! ```
//!
//! ## Modules
//!
//! - [`frequency`] - byte counts and entropy
//! - [`pqueue`] - sorted priority queue used to merge tree nodes
//! - [`table`] - per-symbol code table
//! - [`tree`] - Huffman tree over an index-based arena, encode and decode
//! - [`format`] - container preamble layout and validation
//! - [`codec`] - in-memory, stream, and file entry points

pub mod codec;
pub mod format;
pub mod frequency;
pub mod pqueue;
pub mod table;
pub mod tree;

use std::path::Path;

pub use codec::HaffCodec;
pub use format::{Header, Preamble, SymbolEntry, MAGIC};
pub use frequency::FrequencyTable;
pub use pqueue::PriorityQueue;
pub use table::{Code, CodeTable, MAX_CODE_LEN};
pub use tree::{HuffmanNode, HuffmanTree, NodeId};

pub use haff_bits::{BitArray, BitReader, BitWriter};
pub use haff_core::{
    Codec, CodecConfig, CompressionRatio, CompressionStats, Compressor, Decompressor, Error,
    Result,
};

/// Compress the file at `source` into a HAFF container at `dest`.
pub fn compress<P, Q>(source: P, dest: Q) -> Result<CompressionStats>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    HaffCodec::new().compress_file(source, dest)
}

/// Restore the original bytes of the HAFF container at `source` into `dest`.
pub fn decompress<P, Q>(source: P, dest: Q) -> Result<CompressionStats>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    HaffCodec::new().decompress_file(source, dest)
}
