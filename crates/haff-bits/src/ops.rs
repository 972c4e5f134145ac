//! Bit manipulation inside a single unsigned word.
//!
//! Bits are numbered from the most-significant end: index 0 is the MSB and
//! index `W::BITS - 1` the LSB. Every operation is a constant number of
//! shifts and masks.
//!
//! `insert_bits` and `erase_bits` accept `index` in `[0, W::BITS]` and
//! `count` in `[0, W::BITS - index]`. Shifts by the full word width are part
//! of that range, so the word types provide shifts that saturate to zero
//! instead of overflowing.

use core::fmt::Debug;
use core::hash::Hash;
use core::ops::{BitAnd, BitOr, Not};

/// Fixed-width unsigned integer usable as bit storage.
pub trait BitWord:
    Copy
    + Default
    + Eq
    + Hash
    + Debug
    + Send
    + Sync
    + 'static
    + Not<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
{
    /// Width of the word in bits.
    const BITS: usize;
    /// All bits clear.
    const ZERO: Self;
    /// Only the least-significant bit set.
    const ONE: Self;
    /// All bits set.
    const ONES: Self;

    /// Shift toward the MSB; shifting by `BITS` or more yields zero.
    fn shift_left(self, n: usize) -> Self;

    /// Shift toward the LSB; shifting by `BITS` or more yields zero.
    fn shift_right(self, n: usize) -> Self;
}

macro_rules! impl_bit_word {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BitWord for $ty {
                const BITS: usize = <$ty>::BITS as usize;
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const ONES: Self = <$ty>::MAX;

                #[inline]
                fn shift_left(self, n: usize) -> Self {
                    if n >= <Self as BitWord>::BITS {
                        0
                    } else {
                        self << n
                    }
                }

                #[inline]
                fn shift_right(self, n: usize) -> Self {
                    if n >= <Self as BitWord>::BITS {
                        0
                    } else {
                        self >> n
                    }
                }
            }
        )*
    };
}

impl_bit_word!(u8, u16, u32, u64, u128);

/// Mask selecting bit `index` (MSB-first).
#[inline]
fn bit_mask<W: BitWord>(index: usize) -> W {
    debug_assert!(index < W::BITS, "bit index {index} out of word");
    W::ONE.shift_left(W::BITS - index - 1)
}

/// Read bit `index`.
#[inline]
pub fn get_bit<W: BitWord>(word: W, index: usize) -> bool {
    word & bit_mask::<W>(index) != W::ZERO
}

/// Clear bit `index`, leaving every other bit unchanged.
#[inline]
pub fn clear_bit<W: BitWord>(word: W, index: usize) -> W {
    word & !bit_mask::<W>(index)
}

/// Force bit `index` to `value`, leaving every other bit unchanged.
#[inline]
pub fn set_bit<W: BitWord>(word: W, index: usize, value: bool) -> W {
    let cleared = clear_bit(word, index);
    if value {
        cleared | bit_mask::<W>(index)
    } else {
        cleared
    }
}

/// Open `count` slots at `index` and fill them with `value`.
///
/// Bits before `index` are kept, bits at and after `index` move `count`
/// places toward the LSB, and whatever falls off the low end is lost.
#[inline]
pub fn insert_bits<W: BitWord>(word: W, index: usize, count: usize, value: bool) -> W {
    debug_assert!(index <= W::BITS && count <= W::BITS - index);
    let end = index + count;
    let shifted = word.shift_right(count);
    if value {
        (shifted | W::ONES.shift_left(W::BITS - end)) & (word | W::ONES.shift_right(index))
    } else {
        (shifted & W::ONES.shift_right(end)) | (word & W::ONES.shift_left(W::BITS - index))
    }
}

/// Remove `count` bits at `index`, closing the gap toward the MSB.
///
/// The `count` vacated low-order bits become zero.
#[inline]
pub fn erase_bits<W: BitWord>(word: W, index: usize, count: usize) -> W {
    debug_assert!(index <= W::BITS && count <= W::BITS - index);
    (word & W::ONES.shift_left(W::BITS - index))
        | (word.shift_left(count) & W::ONES.shift_right(index))
}
