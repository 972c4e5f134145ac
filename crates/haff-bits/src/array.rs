//! Fixed-capacity bit sequence stored in a single word.
//!
//! [`BitArray`] keeps up to `W::BITS` bits packed MSB-first in one unsigned
//! word together with a length. It is `Copy`, never allocates, and supports
//! the usual sequence operations (random access, insertion and erasure at any
//! position, push/pop at the back) in O(1) word operations each.
//!
//! Bits at positions `>= len` are always zero, so equality, hashing and
//! [`BitArray::word`] only ever see significant bits.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Index, Range};
use core::str::FromStr;

use haff_core::{Error, Result};

use crate::ops::{self, BitWord};

/// A sequence of at most `W::BITS` bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitArray<W: BitWord = u32> {
    bits: W,
    len: usize,
}

impl<W: BitWord> BitArray<W> {
    /// Create an empty sequence.
    pub fn new() -> Self {
        BitArray {
            bits: W::ZERO,
            len: 0,
        }
    }

    /// Create a sequence of `len` zero bits.
    pub fn with_len(len: usize) -> Result<Self> {
        Self::filled(len, false)
    }

    /// Create a sequence of `len` copies of `value`.
    pub fn filled(len: usize, value: bool) -> Result<Self> {
        let mut array = Self::new();
        array.insert_n(0, len, value)?;
        Ok(array)
    }

    /// Collect bits from an iterator, failing if they do not fit.
    pub fn try_from_iter<I>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        let mut array = Self::new();
        for bit in iter {
            array.push(bit)?;
        }
        Ok(array)
    }

    /// Number of significant bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of bits, `W::BITS`.
    #[inline]
    pub fn capacity(&self) -> usize {
        W::BITS
    }

    /// Raw backing word; bits past `len` are zero.
    #[inline]
    pub fn word(&self) -> W {
        self.bits
    }

    /// Bit at `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| ops::get_bit(self.bits, index))
    }

    /// Bit at `index`, or an out-of-range error past the end.
    pub fn at(&self, index: usize) -> Result<bool> {
        self.get(index)
            .ok_or_else(|| Error::out_of_range("bit index past end of sequence"))
    }

    /// Overwrite the bit at `index`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        if index >= self.len {
            return Err(Error::out_of_range("bit index past end of sequence"));
        }
        self.bits = ops::set_bit(self.bits, index, value);
        Ok(())
    }

    /// Mutable handle to the bit at `index`.
    pub fn bit_mut(&mut self, index: usize) -> Result<BitMut<'_, W>> {
        if index >= self.len {
            return Err(Error::out_of_range("bit index past end of sequence"));
        }
        Ok(BitMut { array: self, index })
    }

    /// First bit.
    pub fn front(&self) -> Result<bool> {
        self.get(0)
            .ok_or_else(|| Error::out_of_range("front of empty sequence"))
    }

    /// Last bit.
    pub fn back(&self) -> Result<bool> {
        self.len
            .checked_sub(1)
            .and_then(|last| self.get(last))
            .ok_or_else(|| Error::out_of_range("back of empty sequence"))
    }

    /// Mutable handle to the first bit.
    pub fn front_mut(&mut self) -> Result<BitMut<'_, W>> {
        if self.is_empty() {
            return Err(Error::out_of_range("front of empty sequence"));
        }
        self.bit_mut(0)
    }

    /// Mutable handle to the last bit.
    pub fn back_mut(&mut self) -> Result<BitMut<'_, W>> {
        match self.len.checked_sub(1) {
            Some(last) => self.bit_mut(last),
            None => Err(Error::out_of_range("back of empty sequence")),
        }
    }

    /// Insert `value` before position `pos`. Returns `pos`.
    pub fn insert(&mut self, pos: usize, value: bool) -> Result<usize> {
        self.insert_n(pos, 1, value)
    }

    /// Insert `count` copies of `value` before position `pos`. Returns `pos`.
    pub fn insert_n(&mut self, pos: usize, count: usize, value: bool) -> Result<usize> {
        if pos > self.len {
            return Err(Error::out_of_range("insert position past end of sequence"));
        }
        if count > W::BITS - self.len {
            return Err(Error::out_of_range("insert exceeds sequence capacity"));
        }
        self.bits = ops::insert_bits(self.bits, pos, count, value);
        self.len += count;
        Ok(pos)
    }

    /// Insert every bit of `iter` before position `pos`, keeping their order.
    ///
    /// The sequence is left untouched when the bits do not fit.
    pub fn insert_iter<I>(&mut self, pos: usize, iter: I) -> Result<usize>
    where
        I: IntoIterator<Item = bool>,
    {
        if pos > self.len {
            return Err(Error::out_of_range("insert position past end of sequence"));
        }
        let incoming = Self::try_from_iter(iter)?;
        self.insert_n(pos, incoming.len, false)?;
        for (offset, bit) in incoming.iter().enumerate() {
            self.bits = ops::set_bit(self.bits, pos + offset, bit);
        }
        Ok(pos)
    }

    /// Remove the bit at `pos`. Returns the position following it, `pos`.
    pub fn erase(&mut self, pos: usize) -> Result<usize> {
        if pos >= self.len {
            return Err(Error::out_of_range("erase position past end of sequence"));
        }
        self.erase_range(pos..pos + 1)
    }

    /// Remove the bits in `range`. Returns `range.start`.
    pub fn erase_range(&mut self, range: Range<usize>) -> Result<usize> {
        if range.start > range.end || range.end > self.len {
            return Err(Error::out_of_range("erase range outside sequence"));
        }
        let count = range.end - range.start;
        self.bits = ops::erase_bits(self.bits, range.start, count);
        self.len -= count;
        Ok(range.start)
    }

    /// Append `value` at the back.
    pub fn push(&mut self, value: bool) -> Result<()> {
        if self.len == W::BITS {
            return Err(Error::out_of_range("push onto full sequence"));
        }
        self.bits = ops::set_bit(self.bits, self.len, value);
        self.len += 1;
        Ok(())
    }

    /// Remove and return the last bit.
    pub fn pop(&mut self) -> Result<bool> {
        let value = self.back()?;
        self.len -= 1;
        self.bits = ops::clear_bit(self.bits, self.len);
        Ok(value)
    }

    /// Grow with copies of `value` or truncate to exactly `count` bits.
    pub fn resize(&mut self, count: usize, value: bool) -> Result<()> {
        if count > W::BITS {
            return Err(Error::out_of_range("resize exceeds sequence capacity"));
        }
        if count >= self.len {
            self.insert_n(self.len, count - self.len, value)?;
        } else {
            self.erase_range(count..self.len)?;
        }
        Ok(())
    }

    /// Remove every bit.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Iterate over the bits front to back.
    pub fn iter(&self) -> Iter<'_, W> {
        Iter {
            array: self,
            front: 0,
            back: self.len,
        }
    }

    /// Whether `prefix` matches the leading bits of this sequence.
    pub fn starts_with(&self, prefix: &Self) -> bool {
        if prefix.len > self.len {
            return false;
        }
        let mask = W::ONES.shift_left(W::BITS - prefix.len);
        self.bits & mask == prefix.bits
    }
}

impl<W: BitWord> Default for BitArray<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: BitWord> Index<usize> for BitArray<W> {
    type Output = bool;

    /// # Panics
    ///
    /// Panics if `index >= len`; use [`BitArray::at`] for a checked read.
    fn index(&self, index: usize) -> &bool {
        match self.get(index) {
            Some(true) => &true,
            Some(false) => &false,
            None => panic!(
                "bit index {index} out of range for sequence of length {}",
                self.len
            ),
        }
    }
}

impl<W: BitWord> TryFrom<&[bool]> for BitArray<W> {
    type Error = Error;

    fn try_from(bits: &[bool]) -> Result<Self> {
        Self::try_from_iter(bits.iter().copied())
    }
}

impl<W: BitWord> FromStr for BitArray<W> {
    type Err = Error;

    /// Parse a string of `'0'` and `'1'` characters.
    fn from_str(text: &str) -> Result<Self> {
        let mut array = Self::new();
        for (offset, ch) in text.chars().enumerate() {
            let bit = match ch {
                '0' => false,
                '1' => true,
                other => {
                    return Err(Error::corrupted_at(
                        format!("invalid bit character {other:?}"),
                        offset,
                    ))
                }
            };
            array.push(bit)?;
        }
        Ok(array)
    }
}

impl<W: BitWord> fmt::Display for BitArray<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl<W: BitWord> fmt::Debug for BitArray<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BitArray")
            .field(&format_args!("{self}"))
            .finish()
    }
}

impl<'a, W: BitWord> IntoIterator for &'a BitArray<W> {
    type Item = bool;
    type IntoIter = Iter<'a, W>;

    fn into_iter(self) -> Iter<'a, W> {
        self.iter()
    }
}

/// Mutable handle to one bit of a [`BitArray`].
///
/// Holds the array's exclusive borrow, so it only lives as long as the
/// statement or block that uses it.
pub struct BitMut<'a, W: BitWord> {
    array: &'a mut BitArray<W>,
    index: usize,
}

impl<W: BitWord> BitMut<'_, W> {
    /// Current value of the bit.
    pub fn get(&self) -> bool {
        ops::get_bit(self.array.bits, self.index)
    }

    /// Overwrite the bit.
    pub fn set(&mut self, value: bool) {
        self.array.bits = ops::set_bit(self.array.bits, self.index, value);
    }

    /// Invert the bit and return its new value.
    pub fn flip(&mut self) -> bool {
        let value = !self.get();
        self.set(value);
        value
    }

    /// Position of the bit inside its array.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<W: BitWord> fmt::Debug for BitMut<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitMut")
            .field("index", &self.index)
            .field("value", &self.get())
            .finish()
    }
}

/// Double-ended iterator over the bits of a [`BitArray`].
#[derive(Debug, Clone)]
pub struct Iter<'a, W: BitWord> {
    array: &'a BitArray<W>,
    front: usize,
    back: usize,
}

impl<W: BitWord> Iterator for Iter<'_, W> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.front == self.back {
            return None;
        }
        let bit = ops::get_bit(self.array.bits, self.front);
        self.front += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<bool> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl<W: BitWord> DoubleEndedIterator for Iter<'_, W> {
    fn next_back(&mut self) -> Option<bool> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(ops::get_bit(self.array.bits, self.back))
    }

    fn nth_back(&mut self, n: usize) -> Option<bool> {
        self.back = self.back.saturating_sub(n).max(self.front);
        self.next_back()
    }
}

impl<W: BitWord> ExactSizeIterator for Iter<'_, W> {}

impl<W: BitWord> FusedIterator for Iter<'_, W> {}
