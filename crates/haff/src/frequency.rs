//! Byte frequency counting.
//!
//! Counts the occurrence of each byte value (0-255) in an input and computes
//! the Shannon entropy bound used to judge the resulting code.

use std::io::{self, Read};

use haff_core::Result;

/// Number of distinct byte symbols.
pub const SYMBOL_COUNT: usize = 256;

/// Occurrence count per byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; SYMBOL_COUNT],
    total: u64,
}

impl FrequencyTable {
    /// Create a zeroed table.
    pub fn new() -> Self {
        Self {
            counts: [0; SYMBOL_COUNT],
            total: 0,
        }
    }

    /// Count every byte of `input`.
    pub fn from_bytes(input: &[u8]) -> Self {
        let mut table = Self::new();
        table.count(input);
        table
    }

    /// Drain `reader`, counting every byte it yields.
    ///
    /// Returns the table; its [`total`](Self::total) is the number of bytes
    /// read.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut table = Self::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            table.count(&buf[..n]);
        }
        Ok(table)
    }

    /// Add the bytes of `input` to the counts.
    pub fn count(&mut self, input: &[u8]) {
        for &byte in input {
            self.counts[byte as usize] += 1;
        }
        self.total += input.len() as u64;
    }

    /// Count for one symbol.
    #[inline]
    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts, i.e. the input length.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct symbols with a nonzero count.
    pub fn used(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Whether nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// `(symbol, count)` pairs for symbols that occur, in ascending order.
    pub fn iter_used(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (0..=u8::MAX)
            .zip(self.counts.iter().copied())
            .filter(|&(_, count)| count > 0)
    }

    /// Shannon entropy of the distribution in bits per symbol.
    ///
    /// Returns 0.0 for an empty table.
    pub fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        self.iter_used()
            .map(|(_, count)| {
                let prob = count as f64 / total;
                -prob * prob.log2()
            })
            .sum()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}
