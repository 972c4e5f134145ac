//! MSB-first bit cursors over `std::io` byte streams.
//!
//! [`BitReader`] exposes the bits of a byte source one at a time, most
//! significant bit of each byte first. [`BitWriter`] packs bits into bytes in
//! the same order and hands each completed byte to its sink. Neither cursor
//! allocates after construction.

use std::io::{self, Read, Write};

use haff_core::Result;

use crate::array::BitArray;
use crate::ops::{self, BitWord};

/// Number of bits in one byte of a stream.
pub const BITS_IN_BYTE: usize = 8;

/// Pull one byte, retrying interrupted reads.
fn read_byte<R: Read>(source: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match source.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Bit cursor over a byte source.
///
/// The reader always holds the byte under the cursor; once the source has
/// no bytes left the reader is exhausted and compares equal to
/// [`BitReader::end`].
#[derive(Debug)]
pub struct BitReader<R> {
    source: R,
    /// Byte under the cursor, `None` once exhausted.
    byte: Option<u8>,
    /// Position inside `byte`, MSB = 0.
    bit: usize,
    /// Byte pulled ahead of the cursor by `is_last_byte`.
    lookahead: Option<Option<u8>>,
    bytes_read: usize,
}

impl<R: Read> BitReader<R> {
    /// Wrap `source` and pull its first byte.
    pub fn new(mut source: R) -> Result<Self> {
        let byte = read_byte(&mut source)?;
        Ok(BitReader {
            source,
            byte,
            bit: 0,
            lookahead: None,
            bytes_read: usize::from(byte.is_some()),
        })
    }

    /// Value of the bit under the cursor, or `None` when exhausted.
    #[inline]
    pub fn peek(&self) -> Option<bool> {
        self.byte.map(|byte| ops::get_bit(byte, self.bit))
    }

    /// Move past the current bit, pulling the next byte after bit 7.
    ///
    /// Does nothing once the reader is exhausted.
    pub fn advance(&mut self) -> Result<()> {
        if self.byte.is_none() {
            return Ok(());
        }
        self.bit += 1;
        if self.bit == BITS_IN_BYTE {
            self.bit = 0;
            self.byte = match self.lookahead.take() {
                Some(next) => next,
                None => read_byte(&mut self.source)?,
            };
            if self.byte.is_some() {
                self.bytes_read += 1;
            }
        }
        Ok(())
    }

    /// Read the current bit and advance.
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        let bit = self.peek();
        if bit.is_some() {
            self.advance()?;
        }
        Ok(bit)
    }

    /// Whether the byte under the cursor is the last one in the source.
    ///
    /// Looks one byte ahead without consuming it. An exhausted reader has no
    /// current byte and reports `false`.
    pub fn is_last_byte(&mut self) -> Result<bool> {
        if self.byte.is_none() {
            return Ok(false);
        }
        let next = match self.lookahead {
            Some(next) => next,
            None => {
                let next = read_byte(&mut self.source)?;
                self.lookahead = Some(next);
                next
            }
        };
        Ok(next.is_none())
    }
}

impl<R> BitReader<R> {
    /// Position of the cursor inside the current byte (0 = MSB).
    #[inline]
    pub fn current_bit(&self) -> usize {
        self.bit
    }

    /// Bytes pulled into the cursor so far, lookahead excluded.
    #[inline]
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// Whether the source has run dry.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.byte.is_none()
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Recover the underlying source. A byte pulled by
    /// [`is_last_byte`](BitReader::is_last_byte) is not returned to it.
    pub fn into_inner(self) -> R {
        self.source
    }
}

impl BitReader<io::Empty> {
    /// The exhausted reader every finished reader compares equal to.
    pub fn end() -> Self {
        BitReader {
            source: io::empty(),
            byte: None,
            bit: 0,
            lookahead: None,
            bytes_read: 0,
        }
    }
}

impl<R, S> PartialEq<BitReader<S>> for BitReader<R> {
    /// Exhausted readers are all equal; live readers compare by position.
    fn eq(&self, other: &BitReader<S>) -> bool {
        match (self.is_exhausted(), other.is_exhausted()) {
            (true, true) => true,
            (false, false) => self.bytes_read == other.bytes_read && self.bit == other.bit,
            _ => false,
        }
    }
}

impl<R: Read> Iterator for BitReader<R> {
    type Item = Result<bool>;

    fn next(&mut self) -> Option<Result<bool>> {
        self.read_bit().transpose()
    }
}

/// Bit cursor over a byte sink.
///
/// Bits accumulate MSB-first in a single byte that is written out as soon as
/// it is full. Call [`flush`](BitWriter::flush) to emit a trailing partial
/// byte; dropping the writer discards it.
#[derive(Debug)]
pub struct BitWriter<W> {
    sink: W,
    byte: u8,
    bit: usize,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Wrap `sink` with an empty accumulator.
    pub fn new(sink: W) -> Self {
        BitWriter {
            sink,
            byte: 0,
            bit: 0,
            bits_written: 0,
        }
    }

    /// Append one bit.
    pub fn write_bit(&mut self, value: bool) -> Result<()> {
        self.byte = ops::set_bit(self.byte, self.bit, value);
        self.bit += 1;
        self.bits_written += 1;
        if self.bit == BITS_IN_BYTE {
            self.sink.write_all(&[self.byte])?;
            self.byte = 0;
            self.bit = 0;
        }
        Ok(())
    }

    /// Append every bit of `bits`, returning how many were written.
    pub fn write_bits<I>(&mut self, bits: I) -> Result<u64>
    where
        I: IntoIterator<Item = bool>,
    {
        let mut count = 0;
        for bit in bits {
            self.write_bit(bit)?;
            count += 1;
        }
        Ok(count)
    }

    /// Append the bits of a code in order.
    pub fn write_code<T: BitWord>(&mut self, code: &BitArray<T>) -> Result<()> {
        for bit in code {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Write out a partially filled byte, zero padded, and flush the sink.
    ///
    /// Returns the number of padding bits added (0 when already aligned).
    pub fn flush(&mut self) -> Result<u8> {
        let padding = if self.bit == 0 {
            0
        } else {
            let padding = BITS_IN_BYTE - self.bit;
            self.sink.write_all(&[self.byte])?;
            self.byte = 0;
            self.bit = 0;
            padding
        };
        self.sink.flush()?;
        Ok(padding as u8)
    }
}

impl<W> BitWriter<W> {
    /// Position of the next bit inside the pending byte (0 = MSB).
    #[inline]
    pub fn current_bit(&self) -> usize {
        self.bit
    }

    /// Total bits accepted, padding excluded.
    #[inline]
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Recover the sink. Unflushed bits are lost.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl BitWriter<io::Sink> {
    /// A writer whose bits go nowhere.
    pub fn end() -> Self {
        BitWriter::new(io::sink())
    }
}
