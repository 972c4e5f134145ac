//! # HAFF Bits
//!
//! Bit-level building blocks for the HAFF Huffman compressor.
//!
//! ## Modules
//!
//! - [`ops`] - O(1) get/set/insert/erase of bits inside one unsigned word,
//!   numbered from the most-significant bit
//! - [`array`] - [`BitArray`], a `Copy` bit sequence stored in a single word,
//!   used to hold one Huffman code per symbol without heap allocation
//! - [`stream`] - [`BitReader`] and [`BitWriter`], MSB-first cursors over
//!   `std::io` byte sources and sinks
//!
//! ## Example
//!
//! ```
//! use haff_bits::{BitArray, BitWriter};
//!
//! let code: BitArray<u32> = "101".parse().unwrap();
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_code(&code).unwrap();
//! let padding = writer.flush().unwrap();
//! assert_eq!(padding, 5);
//! assert_eq!(writer.into_inner(), vec![0b1010_0000]);
//! ```

pub mod array;
pub mod ops;
pub mod stream;

pub use array::{BitArray, BitMut, Iter};
pub use ops::BitWord;
pub use stream::{BitReader, BitWriter, BITS_IN_BYTE};
