//! Per-symbol code table.

use core::fmt;
use core::ops::Index;

use haff_bits::BitArray;

use crate::frequency::{FrequencyTable, SYMBOL_COUNT};

/// One symbol's Huffman code, root-to-leaf.
pub type Code = BitArray<u64>;

/// Longest code a [`Code`] can hold.
pub const MAX_CODE_LEN: usize = 64;

/// Codes for all 256 byte symbols; an empty code marks an unused symbol.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Code; SYMBOL_COUNT],
}

impl CodeTable {
    /// Create a table with every symbol unused.
    pub fn new() -> Self {
        Self {
            codes: [Code::new(); SYMBOL_COUNT],
        }
    }

    /// Code for `symbol`, empty when the symbol is unused.
    #[inline]
    pub fn get(&self, symbol: u8) -> &Code {
        &self.codes[symbol as usize]
    }

    /// Assign `code` to `symbol`. An empty code marks it unused.
    pub fn set(&mut self, symbol: u8, code: Code) {
        self.codes[symbol as usize] = code;
    }

    /// `(symbol, code)` pairs for used symbols, in ascending symbol order.
    pub fn iter_used(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        (0..=u8::MAX)
            .zip(self.codes.iter())
            .filter(|(_, code)| !code.is_empty())
    }

    /// Number of symbols with a code.
    pub fn used_count(&self) -> usize {
        self.codes.iter().filter(|code| !code.is_empty()).count()
    }

    /// Whether no symbol has a code.
    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(Code::is_empty)
    }

    /// Length of the longest code, 0 for an empty table.
    pub fn max_len(&self) -> usize {
        self.codes.iter().map(Code::len).max().unwrap_or(0)
    }

    /// Sum of all code lengths.
    pub fn total_code_bits(&self) -> u64 {
        self.codes.iter().map(|code| code.len() as u64).sum()
    }

    /// Payload size in bits for input with the given frequencies.
    ///
    /// Symbols without a code contribute nothing.
    pub fn encoded_bits(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .iter_used()
            .map(|(symbol, count)| count * self.get(symbol).len() as u64)
            .sum()
    }

    /// Whether no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let used: Vec<&Code> = self.iter_used().map(|(_, code)| code).collect();
        used.iter().enumerate().all(|(i, a)| {
            used.iter()
                .enumerate()
                .all(|(j, b)| i == j || !b.starts_with(a))
        })
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<u8> for CodeTable {
    type Output = Code;

    fn index(&self, symbol: u8) -> &Code {
        self.get(symbol)
    }
}

impl fmt::Debug for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (symbol, code) in self.iter_used() {
            map.entry(&symbol, &format_args!("{code}"));
        }
        map.finish()
    }
}
