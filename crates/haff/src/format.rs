//! HAFF container layout.
//!
//! ```text
//! offset          size        field
//! 0               4           magic "HAFF"
//! 4               2 (LE)      entry count n
//! 6               2 (LE)      table offset: absolute offset of the pad byte
//! 8               2 * n       entries {symbol: u8, bit length: u8}, ascending
//! 8 + 2n          ceil(L/8)   codes in entry order, MSB-first, zero padded
//! table offset    1           payload pad bits (0-7)
//! table offset+1  ...         payload, MSB-first, zero padded
//! ```
//!
//! `L` is the sum of all code lengths. Everything up to and including the
//! pad byte is the preamble; the payload runs to the end of the stream.

use std::io::{self, Read, Write};

use haff_bits::{BitReader, BitWriter, BITS_IN_BYTE};
use haff_core::{Error, Result};
use tracing::trace;

use crate::frequency::SYMBOL_COUNT;
use crate::table::{Code, CodeTable, MAX_CODE_LEN};

/// Container magic bytes.
pub const MAGIC: [u8; 4] = *b"HAFF";

/// Size of the fixed header: magic, entry count, table offset.
pub const HEADER_SIZE: usize = 8;

/// Size of one symbol entry.
pub const ENTRY_SIZE: usize = 2;

/// Largest possible preamble: every symbol present with a 64-bit code.
pub const MAX_PREAMBLE_SIZE: usize =
    HEADER_SIZE + SYMBOL_COUNT * ENTRY_SIZE + SYMBOL_COUNT * MAX_CODE_LEN / BITS_IN_BYTE + 1;

/// Fixed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub entry_count: u16,
    /// Absolute offset of the payload pad byte.
    pub table_offset: u16,
}

/// Code length of one symbol as stored in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    pub symbol: u8,
    pub bit_length: u8,
}

/// Everything before the payload bits.
#[derive(Debug, Clone)]
pub struct Preamble {
    pub header: Header,
    pub table: CodeTable,
    pub padding_bits: u8,
}

impl Preamble {
    /// Offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        usize::from(self.header.table_offset) + 1
    }
}

/// Zero bits needed to byte-align a payload of `bits` bits.
pub fn payload_padding(bits: u64) -> u8 {
    ((BITS_IN_BYTE as u64 - bits % BITS_IN_BYTE as u64) % BITS_IN_BYTE as u64) as u8
}

/// Bytes occupied by `bits` bits once padded.
pub fn packed_len(bits: u64) -> u64 {
    bits.div_ceil(BITS_IN_BYTE as u64)
}

/// Header for `table`, with the table offset computed from its code lengths.
pub fn header_for(table: &CodeTable) -> Result<Header> {
    let entry_count = table.used_count();
    let offset = HEADER_SIZE as u64
        + (entry_count * ENTRY_SIZE) as u64
        + packed_len(table.total_code_bits());
    Ok(Header {
        entry_count: u16::try_from(entry_count)
            .map_err(|_| Error::out_of_range("entry count exceeds u16"))?,
        table_offset: u16::try_from(offset)
            .map_err(|_| Error::out_of_range("table offset exceeds u16"))?,
    })
}

/// Write the preamble for `table`, ending with the payload pad byte.
pub fn write_preamble<W: Write>(
    table: &CodeTable,
    padding_bits: u8,
    sink: &mut W,
) -> Result<Header> {
    let header = header_for(table)?;

    sink.write_all(&MAGIC)?;
    sink.write_all(&header.entry_count.to_le_bytes())?;
    sink.write_all(&header.table_offset.to_le_bytes())?;

    for (symbol, code) in table.iter_used() {
        sink.write_all(&[symbol, code.len() as u8])?;
    }

    let mut bits = BitWriter::new(&mut *sink);
    for (_, code) in table.iter_used() {
        bits.write_code(code)?;
    }
    bits.flush()?;

    sink.write_all(&[padding_bits])?;
    trace!(
        "Wrote HAFF preamble: {} entries, table offset {}, pad bits {}",
        header.entry_count,
        header.table_offset,
        padding_bits
    );
    Ok(header)
}

/// Read and validate the preamble, leaving `source` at the first payload byte.
pub fn read_preamble<R: Read>(source: &mut R) -> Result<Preamble> {
    let mut fixed = [0u8; HEADER_SIZE];
    read_exact_at(source, &mut fixed[..4], 0)?;
    let magic = [fixed[0], fixed[1], fixed[2], fixed[3]];
    if magic != MAGIC {
        return Err(Error::InvalidMagic { found: magic });
    }
    read_exact_at(source, &mut fixed[4..], 4)?;
    let header = Header {
        entry_count: u16::from_le_bytes([fixed[4], fixed[5]]),
        table_offset: u16::from_le_bytes([fixed[6], fixed[7]]),
    };
    trace!(
        "Read HAFF header: {} entries, table offset {}",
        header.entry_count,
        header.table_offset
    );

    let entry_count = usize::from(header.entry_count);
    if entry_count > SYMBOL_COUNT {
        return Err(Error::corrupted_at(
            format!("{entry_count} table entries for {SYMBOL_COUNT} symbols"),
            4,
        ));
    }

    let mut raw_entries = vec![0u8; entry_count * ENTRY_SIZE];
    read_exact_at(source, &mut raw_entries, HEADER_SIZE)?;
    let entries = parse_entries(&raw_entries)?;

    let total_bits: u64 = entries.iter().map(|e| u64::from(e.bit_length)).sum();
    let codes_offset = HEADER_SIZE + raw_entries.len();
    let expected_offset = codes_offset as u64 + packed_len(total_bits);
    if u64::from(header.table_offset) != expected_offset {
        return Err(Error::corrupted_at(
            format!(
                "table offset {} does not match code lengths (expected {expected_offset})",
                header.table_offset
            ),
            6,
        ));
    }

    let mut packed = vec![0u8; packed_len(total_bits) as usize];
    read_exact_at(source, &mut packed, codes_offset)?;
    let table = unpack_codes(&entries, &packed)?;

    let mut pad = [0u8; 1];
    read_exact_at(source, &mut pad, usize::from(header.table_offset))?;
    let padding_bits = pad[0];
    if usize::from(padding_bits) >= BITS_IN_BYTE {
        return Err(Error::corrupted_at(
            format!("payload pad of {padding_bits} bits"),
            usize::from(header.table_offset),
        ));
    }

    trace!(
        "Read HAFF code table: {} codes, {} code bits, pad bits {}",
        entries.len(),
        total_bits,
        padding_bits
    );
    Ok(Preamble {
        header,
        table,
        padding_bits,
    })
}

fn parse_entries(raw: &[u8]) -> Result<Vec<SymbolEntry>> {
    let mut entries: Vec<SymbolEntry> = Vec::with_capacity(raw.len() / ENTRY_SIZE);
    for (index, pair) in raw.chunks_exact(ENTRY_SIZE).enumerate() {
        let entry = SymbolEntry {
            symbol: pair[0],
            bit_length: pair[1],
        };
        let offset = HEADER_SIZE + index * ENTRY_SIZE;
        if entry.bit_length == 0 || usize::from(entry.bit_length) > MAX_CODE_LEN {
            return Err(Error::corrupted_at(
                format!(
                    "code length {} for symbol {:#04x} outside 1..={MAX_CODE_LEN}",
                    entry.bit_length, entry.symbol
                ),
                offset,
            ));
        }
        if let Some(previous) = entries.last() {
            if previous.symbol >= entry.symbol {
                return Err(Error::corrupted_at(
                    format!(
                        "symbol {:#04x} out of order after {:#04x}",
                        entry.symbol, previous.symbol
                    ),
                    offset,
                ));
            }
        }
        entries.push(entry);
    }
    Ok(entries)
}

fn unpack_codes(entries: &[SymbolEntry], packed: &[u8]) -> Result<CodeTable> {
    let mut table = CodeTable::new();
    let mut bits = BitReader::new(packed)?;
    for entry in entries {
        let mut code = Code::new();
        for _ in 0..entry.bit_length {
            let bit = bits
                .read_bit()?
                .ok_or_else(|| Error::corrupted("packed code table shorter than its entries"))?;
            code.push(bit)?;
        }
        table.set(entry.symbol, code);
    }
    Ok(table)
}

/// `read_exact` that reports truncation as malformed input at `offset`.
fn read_exact_at<R: Read>(source: &mut R, buf: &mut [u8], offset: usize) -> Result<()> {
    source.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::unexpected_eof(offset),
        _ => Error::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(u8, &str)]) -> CodeTable {
        let mut table = CodeTable::new();
        for &(symbol, code) in entries {
            table.set(symbol, code.parse().unwrap());
        }
        table
    }

    fn preamble_bytes(table: &CodeTable, padding_bits: u8) -> Vec<u8> {
        let mut out = Vec::new();
        write_preamble(table, padding_bits, &mut out).unwrap();
        out
    }

    #[test]
    fn test_payload_padding() {
        assert_eq!(payload_padding(0), 0);
        assert_eq!(payload_padding(4), 4);
        assert_eq!(payload_padding(8), 0);
        assert_eq!(payload_padding(9), 7);
        assert_eq!(packed_len(9), 2);
    }

    #[test]
    fn test_write_layout() {
        let table = table(&[(b'a', "1"), (b'b', "01"), (b'c', "00")]);
        let bytes = preamble_bytes(&table, 3);
        assert_eq!(
            bytes,
            vec![
                b'H', b'A', b'F', b'F', //
                3, 0, // entry count
                15, 0, // table offset: 8 + 6 + 1
                b'a', 1, b'b', 2, b'c', 2, //
                0b1010_0000, // "1" "01" "00"
                3,           // pad bits
            ]
        );
    }

    #[test]
    fn test_empty_table_layout() {
        let bytes = preamble_bytes(&CodeTable::new(), 0);
        assert_eq!(bytes, vec![b'H', b'A', b'F', b'F', 0, 0, 8, 0, 0]);
        let preamble = read_preamble(&mut bytes.as_slice()).unwrap();
        assert!(preamble.table.is_empty());
        assert_eq!(preamble.payload_offset(), 9);
    }

    #[test]
    fn test_read_back() {
        let table = table(&[(0, "0"), (7, "10"), (255, "11")]);
        let mut bytes = preamble_bytes(&table, 5);
        bytes.push(0xAB);

        let mut source = bytes.as_slice();
        let preamble = read_preamble(&mut source).unwrap();
        assert_eq!(preamble.table, table);
        assert_eq!(preamble.padding_bits, 5);
        assert_eq!(preamble.header.entry_count, 3);
        assert_eq!(source, &[0xAB]);
    }

    #[test]
    fn test_long_codes_span_bytes() {
        let long = "1".repeat(63) + "0";
        let ones = "1".repeat(64);
        let table = table(&[(1, "0"), (2, long.as_str()), (3, ones.as_str())]);
        let bytes = preamble_bytes(&table, 0);
        assert_eq!(bytes.len(), HEADER_SIZE + 6 + 17 + 1);
        assert_eq!(read_preamble(&mut bytes.as_slice()).unwrap().table, table);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = preamble_bytes(&CodeTable::new(), 0);
        bytes[0] = b'G';
        let err = read_preamble(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic { found } if &found == b"GAFF"));
    }

    #[test]
    fn test_truncation_is_malformed() {
        let table = table(&[(b'a', "0"), (b'b', "1")]);
        let bytes = preamble_bytes(&table, 0);
        for len in 0..bytes.len() {
            let err = read_preamble(&mut &bytes[..len]).unwrap_err();
            assert!(err.is_malformed_input(), "prefix of {len} bytes: {err}");
        }
    }

    #[test]
    fn test_rejects_bad_code_length() {
        let mut bytes = preamble_bytes(&table(&[(b'a', "0"), (b'b', "1")]), 0);
        bytes[9] = 0;
        assert!(read_preamble(&mut bytes.as_slice()).is_err());
        bytes[9] = 65;
        assert!(read_preamble(&mut bytes.as_slice()).is_err());
    }

    #[test]
    fn test_rejects_unsorted_entries() {
        let mut bytes = preamble_bytes(&table(&[(b'a', "0"), (b'b', "1")]), 0);
        bytes.swap(8, 10);
        let err = read_preamble(&mut bytes.as_slice()).unwrap_err();
        assert!(err.to_string().contains("out of order"));

        bytes[8] = bytes[10];
        assert!(read_preamble(&mut bytes.as_slice()).is_err());
    }

    #[test]
    fn test_rejects_wrong_offset() {
        let mut bytes = preamble_bytes(&table(&[(b'a', "0"), (b'b', "1")]), 0);
        bytes[6] += 1;
        let err = read_preamble(&mut bytes.as_slice()).unwrap_err();
        assert!(err.to_string().contains("table offset"));
    }

    #[test]
    fn test_rejects_oversized_pad() {
        let mut bytes = preamble_bytes(&table(&[(b'a', "0"), (b'b', "1")]), 0);
        let last = bytes.len() - 1;
        bytes[last] = 8;
        assert!(read_preamble(&mut bytes.as_slice())
            .unwrap_err()
            .is_malformed_input());
    }

    #[test]
    fn test_rejects_too_many_entries() {
        let bytes = [b'H', b'A', b'F', b'F', 0x01, 0x01, 0, 0];
        assert!(read_preamble(&mut &bytes[..]).is_err());
    }

    #[test]
    fn test_max_preamble_size() {
        let mut table = CodeTable::new();
        for symbol in 0..=255u8 {
            table.set(symbol, Code::filled(64, symbol % 2 == 0).unwrap());
        }
        assert_eq!(preamble_bytes(&table, 0).len(), MAX_PREAMBLE_SIZE);
    }
}
