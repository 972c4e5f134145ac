//! Shared foundation for the HAFF crates.
//!
//! Holds the [`Error`] type, the [`Compressor`]/[`Decompressor`]/[`Codec`]
//! traits implemented by `haff::HaffCodec`, run statistics, and the
//! serde-loadable [`CodecConfig`].
//!
//! ```ignore
//! use haff_core::{Codec, Compressor, Decompressor};
//! use haff::HaffCodec;
//!
//! let codec = HaffCodec::new();
//! let packed = codec.compress(b"abracadabra")?;
//! assert_eq!(codec.decompress(&packed)?, b"abracadabra");
//! ```

pub mod config;
pub mod error;
pub mod stats;
pub mod traits;

pub use config::CodecConfig;
pub use error::{Error, Result};
pub use stats::{CompressionRatio, CompressionStats};
pub use traits::{Codec, Compressor, Decompressor};
