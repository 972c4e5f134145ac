//! HAFF codec: in-memory, stream, and file entry points.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Instant;

use haff_bits::{BitReader, BitWriter, BITS_IN_BYTE};
use haff_core::{
    Codec, CodecConfig, CompressionStats, Compressor, Decompressor, Error, Result,
};
use tracing::{info, warn};

use crate::format::{self, MAX_PREAMBLE_SIZE};
use crate::frequency::FrequencyTable;
use crate::table::MAX_CODE_LEN;
use crate::tree::HuffmanTree;

/// Huffman codec producing HAFF containers.
#[derive(Debug, Clone, Default)]
pub struct HaffCodec {
    config: CodecConfig,
}

impl HaffCodec {
    /// Create a codec with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with a validated configuration.
    pub fn with_config(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compress everything from the current position of `source` to its end.
    ///
    /// The source is read twice: once to count frequencies, then rewound to
    /// where it started and encoded.
    pub fn compress_stream<R, W>(&self, source: &mut R, sink: &mut W) -> Result<CompressionStats>
    where
        R: Read + Seek,
        W: Write,
    {
        let start = Instant::now();
        let origin = source.stream_position()?;
        let frequencies = FrequencyTable::from_reader(&mut *source)?;
        source.seek(SeekFrom::Start(origin))?;

        let tree = HuffmanTree::from_frequencies(&frequencies)?;
        let mut stats = self.encode_container(&tree, &frequencies, source, sink)?;
        stats.time_us = start.elapsed().as_micros() as u64;
        Ok(stats)
    }

    /// Decode a whole container from `source` into `sink`.
    pub fn decompress_stream<R, W>(&self, source: &mut R, sink: &mut W) -> Result<CompressionStats>
    where
        R: Read,
        W: Write,
    {
        let start = Instant::now();
        let preamble = format::read_preamble(source)?;
        let payload_offset = preamble.payload_offset();
        let padding_bits = preamble.padding_bits;
        let tree = HuffmanTree::from_code_table(preamble.table)?;

        let mut reader = BitReader::new(&mut *source)?;
        let decoded = tree.decode(&mut reader, padding_bits, sink)?;
        sink.flush()?;

        let payload_bytes = reader.bytes_read();
        let payload_bits = if payload_bytes == 0 {
            0
        } else {
            (payload_bytes * BITS_IN_BYTE) as u64 - u64::from(padding_bits)
        };
        Ok(CompressionStats {
            original_size: decoded as usize,
            compressed_size: payload_offset + payload_bytes,
            time_us: start.elapsed().as_micros() as u64,
            symbols_used: tree.leaf_count(),
            payload_bits,
            padding_bits,
        })
    }

    /// Compress the file at `source` into a new file at `dest`.
    ///
    /// A failed run removes `dest` like [`decompress_file`](Self::decompress_file).
    pub fn compress_file<P, Q>(&self, source: P, dest: Q) -> Result<CompressionStats>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (source, dest) = (source.as_ref(), dest.as_ref());
        let input = File::open(source).map_err(|e| Error::open(source, e))?;
        let output = File::create(dest).map_err(|e| Error::open(dest, e))?;
        let mut reader = BufReader::with_capacity(self.config.input_buffer_size, input);
        let mut writer = BufWriter::with_capacity(self.config.output_buffer_size, output);

        let written = self
            .compress_stream(&mut reader, &mut writer)
            .and_then(|stats| Ok(writer.flush().map(|()| stats)?));
        let stats = match written {
            Ok(stats) => stats,
            Err(err) => {
                drop(writer);
                self.discard_partial(dest);
                return Err(err);
            }
        };
        info!(
            "Compressed {} -> {}: {} -> {} bytes ({:.2}x, {} symbols) in {} us",
            source.display(),
            dest.display(),
            stats.original_size,
            stats.compressed_size,
            stats.ratio().ratio(),
            stats.symbols_used,
            stats.time_us
        );
        Ok(stats)
    }

    /// Decompress the container at `source` into a new file at `dest`.
    ///
    /// When decoding fails and `remove_partial_output` is set, the partly
    /// written `dest` is deleted before the error is returned.
    pub fn decompress_file<P, Q>(&self, source: P, dest: Q) -> Result<CompressionStats>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (source, dest) = (source.as_ref(), dest.as_ref());
        let input = File::open(source).map_err(|e| Error::open(source, e))?;
        let output = File::create(dest).map_err(|e| Error::open(dest, e))?;
        let mut reader = BufReader::with_capacity(self.config.input_buffer_size, input);
        let mut writer = BufWriter::with_capacity(self.config.output_buffer_size, output);

        match self.decompress_stream(&mut reader, &mut writer) {
            Ok(stats) => {
                info!(
                    "Decompressed {} -> {}: {} -> {} bytes in {} us",
                    source.display(),
                    dest.display(),
                    stats.compressed_size,
                    stats.original_size,
                    stats.time_us
                );
                Ok(stats)
            }
            Err(err) => {
                drop(writer);
                self.discard_partial(dest);
                Err(err)
            }
        }
    }

    fn discard_partial(&self, dest: &Path) {
        if !self.config.remove_partial_output {
            return;
        }
        if let Err(cleanup) = fs::remove_file(dest) {
            warn!(
                "Failed to remove partial output {}: {}",
                dest.display(),
                cleanup
            );
        }
    }

    /// Write preamble and payload for `input`, whose frequencies built `tree`.
    ///
    /// The pad bit count goes into the preamble before any payload bit is
    /// written, so it is derived from the frequencies and checked against the
    /// writer afterwards.
    fn encode_container<R, W>(
        &self,
        tree: &HuffmanTree,
        frequencies: &FrequencyTable,
        mut input: R,
        sink: &mut W,
    ) -> Result<CompressionStats>
    where
        R: Read,
        W: Write,
    {
        let table = tree.code_table();
        let expected_bits = table.encoded_bits(frequencies);
        let expected_padding = format::payload_padding(expected_bits);
        let header = format::write_preamble(table, expected_padding, sink)?;

        let mut writer = BitWriter::new(&mut *sink);
        let mut chunk = vec![0u8; self.config.input_buffer_size];
        let mut original_size = 0usize;
        let mut payload_bits = 0u64;
        loop {
            let n = match input.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            payload_bits += tree.encode(chunk[..n].iter().copied(), &mut writer)?;
            original_size += n;
        }
        let padding_bits = writer.flush()?;

        if payload_bits != expected_bits || padding_bits != expected_padding {
            return Err(Error::corrupted(format!(
                "input changed between passes: expected {expected_bits} payload bits, wrote {payload_bits}"
            )));
        }

        Ok(CompressionStats {
            original_size,
            compressed_size: usize::from(header.table_offset)
                + 1
                + format::packed_len(payload_bits) as usize,
            time_us: 0,
            symbols_used: tree.leaf_count(),
            payload_bits,
            padding_bits,
        })
    }
}

impl Compressor for HaffCodec {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let frequencies = FrequencyTable::from_bytes(input);
        let tree = HuffmanTree::from_frequencies(&frequencies)?;
        let mut output = Vec::new();
        self.encode_container(&tree, &frequencies, input, &mut output)?;
        Ok(output)
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        // every symbol could in principle need the longest code
        MAX_PREAMBLE_SIZE + input_len.saturating_mul(MAX_CODE_LEN / BITS_IN_BYTE)
    }
}

impl Decompressor for HaffCodec {
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut source = input;
        let mut output = Vec::new();
        self.decompress_stream(&mut source, &mut output)?;
        Ok(output)
    }
}

impl Codec for HaffCodec {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_roundtrip() {
        let codec = HaffCodec::new();
        let input = b"Hello, HAFF! Hello, Huffman! Hello, world!";
        let compressed = codec.compress(input).unwrap();
        assert_eq!(&compressed[..4], b"HAFF");
        assert_eq!(codec.decompress(&compressed).unwrap(), input);
        assert!(codec.verify_roundtrip(input).unwrap());
    }

    #[test]
    fn test_empty_input() {
        let codec = HaffCodec::new();
        let compressed = codec.compress(&[]).unwrap();
        assert_eq!(compressed, vec![b'H', b'A', b'F', b'F', 0, 0, 8, 0, 0]);
        assert!(codec.decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_single_symbol_container() {
        let codec = HaffCodec::new();
        let compressed = codec.compress(b"zzzz").unwrap();
        assert_eq!(
            compressed,
            vec![b'H', b'A', b'F', b'F', 1, 0, 11, 0, b'z', 1, 0b0000_0000, 4, 0b0000_0000]
        );
        assert_eq!(codec.decompress(&compressed).unwrap(), b"zzzz");
    }

    #[test]
    fn test_two_symbol_container() {
        let codec = HaffCodec::new();
        let compressed = codec.compress(b"aaab").unwrap();
        assert_eq!(compressed.len(), 15);
        assert_eq!(&compressed[4..10], &[2, 0, 13, 0, b'a', 1]);
        assert_eq!(&compressed[10..12], &[b'b', 1]);
        // pad byte, then a a a b packed into four bits
        assert_eq!(compressed[13], 4);
        let a_is_zero = compressed[12] == 0b0100_0000;
        let expected_payload = if a_is_zero { 0b0001_0000 } else { 0b1110_0000 };
        assert_eq!(compressed[14], expected_payload);
        assert_eq!(codec.decompress(&compressed).unwrap(), b"aaab");
    }

    #[test]
    fn test_single_byte() {
        let codec = HaffCodec::new();
        assert!(codec.verify_roundtrip(&[0x00]).unwrap());
        assert!(codec.verify_roundtrip(&[0xFF]).unwrap());
    }

    #[test]
    fn test_all_byte_values() {
        let codec = HaffCodec::new();
        let input: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let compressed = codec.compress(&input).unwrap();
        assert_eq!(codec.decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn test_skewed_input_compresses() {
        let codec = HaffCodec::new();
        let mut input = vec![b'e'; 10_000];
        input.extend((0..1000u32).map(|i| b'a' + (i % 20) as u8));
        let ratio = codec.measure_ratio(&input).unwrap();
        assert!(ratio.is_effective());
        assert!(ratio.ratio() > 3.0, "ratio was {}", ratio.ratio());
    }

    #[test]
    fn test_compress_to_and_decompress_to() {
        let codec = HaffCodec::new();
        let input = b"abcabcabcabc";
        let mut compressed = vec![0u8; codec.max_compressed_size(input.len())];
        let written = codec.compress_to(input, &mut compressed).unwrap();
        assert!(written <= compressed.len());

        let mut output = [0u8; 12];
        let n = codec.decompress_to(&compressed[..written], &mut output).unwrap();
        assert_eq!(&output[..n], input);

        let mut tiny = [0u8; 4];
        let err = codec.compress_to(input, &mut tiny).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { .. }));
    }

    #[test]
    fn test_stream_starts_at_current_position() {
        let codec = HaffCodec::new();
        let mut source = Cursor::new(b"skip:payload payload".to_vec());
        source.set_position(5);
        let mut container = Vec::new();
        let stats = codec.compress_stream(&mut source, &mut container).unwrap();
        assert_eq!(stats.original_size, 15);
        assert_eq!(stats.compressed_size, container.len());

        let mut output = Vec::new();
        let back = codec
            .decompress_stream(&mut container.as_slice(), &mut output)
            .unwrap();
        assert_eq!(output, b"payload payload");
        assert_eq!(back.original_size, 15);
        assert_eq!(back.compressed_size, container.len());
        assert_eq!(back.payload_bits, stats.payload_bits);
        assert_eq!(back.padding_bits, stats.padding_bits);
    }

    #[test]
    fn test_stats_match_container() {
        let codec = HaffCodec::new();
        let mut container = Vec::new();
        let stats = codec
            .compress_stream(&mut Cursor::new(b"aaab".to_vec()), &mut container)
            .unwrap();
        assert_eq!(stats.payload_bits, 4);
        assert_eq!(stats.padding_bits, 4);
        assert_eq!(stats.symbols_used, 2);
        assert_eq!(stats.compressed_size, 15);
        assert!((stats.bits_per_symbol() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_magic() {
        let codec = HaffCodec::new();
        let mut compressed = codec.compress(b"data").unwrap();
        compressed[..4].copy_from_slice(b"GZIP");
        let err = codec.decompress(&compressed).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic { .. }));
        assert_eq!(err.category(), "invalid_magic");
    }

    /// Four equally frequent symbols, so every code is two bits long and
    /// 1000 repetitions fill the payload with no padding.
    fn two_bit_codes_input() -> Vec<u8> {
        b"abcd".repeat(1000)
    }

    #[test]
    fn test_whole_byte_truncation_decodes_prefix() {
        // no stored length: dropping whole payload bytes loses symbols silently
        let codec = HaffCodec::new();
        let input = two_bit_codes_input();
        let compressed = codec.compress(&input).unwrap();
        assert_eq!(compressed[compressed.len() - 1001], 0);

        let output = codec.decompress(&compressed[..compressed.len() - 3]).unwrap();
        assert_eq!(output.len(), input.len() - 12);
        assert_eq!(output, &input[..output.len()]);
    }

    #[test]
    fn test_trailing_zero_byte_decodes_extra_symbols() {
        // appended bytes are read as payload too
        let codec = HaffCodec::new();
        let mut compressed = codec.compress(b"aaab").unwrap();
        compressed.push(0x00);

        let tree = HuffmanTree::from_data(b"aaab").unwrap();
        let zero_symbol = if tree.code(b'a').to_string() == "0" { b'a' } else { b'b' };
        let output = codec.decompress(&compressed).unwrap();
        assert_eq!(output.len(), 12);
        assert_eq!(&output[..4], b"aaab");
        assert!(output[4..].iter().all(|&b| b == zero_symbol));
    }

    #[test]
    fn test_padding_cutting_a_code_is_rejected() {
        let codec = HaffCodec::new();
        let mut compressed = codec.compress(&two_bit_codes_input()).unwrap();
        let pad_at = usize::from(u16::from_le_bytes([compressed[6], compressed[7]]));
        compressed[pad_at] = 1;

        let err = codec.decompress(&compressed).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("inside a code"));
    }

    #[test]
    fn test_truncated_preamble() {
        let codec = HaffCodec::new();
        let compressed = codec.compress(b"some text to compress").unwrap();
        let err = codec.decompress(&compressed[..10]).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_payload_without_codes_is_rejected() {
        let codec = HaffCodec::new();
        let mut compressed = codec.compress(&[]).unwrap();
        compressed.push(0xFF);
        assert!(codec.decompress(&compressed).unwrap_err().is_malformed_input());
    }

    #[test]
    fn test_with_config_validates() {
        let config = CodecConfig {
            input_buffer_size: 0,
            ..Default::default()
        };
        assert!(HaffCodec::with_config(config).is_err());

        let config = CodecConfig {
            input_buffer_size: 3,
            ..Default::default()
        };
        let codec = HaffCodec::with_config(config).unwrap();
        assert_eq!(codec.config().input_buffer_size, 3);
        assert!(codec.verify_roundtrip(b"small buffers still round-trip").unwrap());
    }

    #[test]
    fn test_codec_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HaffCodec>();
        assert_send_sync::<HuffmanTree>();
    }
}
