//! Whole-buffer codec traits.
//!
//! Implementors provide [`Compressor::compress`] and
//! [`Decompressor::decompress`]; the slice variants and [`Codec`] helpers
//! come for free.

use crate::error::{Error, Result};
use crate::stats::CompressionRatio;

pub trait Compressor {
    /// Encodes all of `input` into a fresh container.
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Encodes into `output`, returning the bytes used.
    ///
    /// Fails with [`Error::BufferTooSmall`] if the container does not fit;
    /// `output` is left untouched in that case.
    fn compress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let compressed = self.compress(input)?;
        copy_into(&compressed, output)
    }

    /// Upper bound on the container size for `input_len` bytes of input.
    fn max_compressed_size(&self, input_len: usize) -> usize;
}

pub trait Decompressor {
    /// Restores the bytes held in a container.
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Like [`decompress`](Self::decompress), writing into `output`.
    fn decompress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let decompressed = self.decompress(input)?;
        copy_into(&decompressed, output)
    }
}

/// A type that can both pack and unpack.
pub trait Codec: Compressor + Decompressor {
    /// Whether `data` survives a compress/decompress cycle unchanged.
    fn verify_roundtrip(&self, data: &[u8]) -> Result<bool> {
        let restored = self.decompress(&self.compress(data)?)?;
        Ok(restored == data)
    }

    fn measure_ratio(&self, data: &[u8]) -> Result<CompressionRatio> {
        let packed = self.compress(data)?;
        Ok(CompressionRatio::new(data.len(), packed.len()))
    }
}

fn copy_into(data: &[u8], output: &mut [u8]) -> Result<usize> {
    if data.len() > output.len() {
        return Err(Error::buffer_too_small(data.len(), output.len()));
    }
    output[..data.len()].copy_from_slice(data);
    Ok(data.len())
}
