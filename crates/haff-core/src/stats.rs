//! Size and timing figures reported by the codec entry points.

/// Original versus compressed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionRatio {
    pub original_size: usize,
    pub compressed_size: usize,
}

impl CompressionRatio {
    pub fn new(original_size: usize, compressed_size: usize) -> Self {
        CompressionRatio {
            original_size,
            compressed_size,
        }
    }

    /// `original / compressed`; above 1.0 means the output shrank.
    /// Returns 0.0 when nothing was written.
    pub fn ratio(&self) -> f64 {
        match self.compressed_size {
            0 => 0.0,
            compressed => self.original_size as f64 / compressed as f64,
        }
    }

    /// Share of the original size saved, in percent. Negative when the
    /// output grew.
    pub fn savings_percent(&self) -> f64 {
        match self.original_size {
            0 => 0.0,
            original => 100.0 * self.bytes_saved() as f64 / original as f64,
        }
    }

    /// Bytes saved; negative when the output grew.
    pub fn bytes_saved(&self) -> i64 {
        self.original_size as i64 - self.compressed_size as i64
    }

    /// Whether the output is smaller than the input.
    pub fn is_effective(&self) -> bool {
        self.compressed_size < self.original_size
    }
}

/// Figures for one compress or decompress run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Bytes of plain data.
    pub original_size: usize,

    /// Bytes of container, preamble included.
    pub compressed_size: usize,

    /// Wall-clock duration in microseconds.
    pub time_us: u64,

    /// Distinct symbols with a code.
    pub symbols_used: usize,

    /// Significant bits in the encoded payload.
    pub payload_bits: u64,

    /// Zero bits appended to byte-align the payload (0-7).
    pub padding_bits: u8,
}

impl CompressionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ratio(&self) -> CompressionRatio {
        CompressionRatio::new(self.original_size, self.compressed_size)
    }

    /// Plain bytes processed per second; 0.0 if no time was recorded.
    pub fn throughput_bps(&self) -> f64 {
        match self.time_us {
            0 => 0.0,
            micros => self.original_size as f64 / (micros as f64 / 1e6),
        }
    }

    /// [`throughput_bps`](Self::throughput_bps) in MB/s.
    pub fn throughput_mbs(&self) -> f64 {
        self.throughput_bps() / 1e6
    }

    /// Average payload bits spent per original byte.
    pub fn bits_per_symbol(&self) -> f64 {
        match self.original_size {
            0 => 0.0,
            original => self.payload_bits as f64 / original as f64,
        }
    }

    pub fn savings_percent(&self) -> f64 {
        self.ratio().savings_percent()
    }
}
