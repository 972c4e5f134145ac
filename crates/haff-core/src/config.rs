//! Codec configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for the file and stream pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Input buffer size (default: 64 KB).
    #[serde(default = "default_buffer_size")]
    pub input_buffer_size: usize,

    /// Output buffer size (default: 64 KB).
    #[serde(default = "default_buffer_size")]
    pub output_buffer_size: usize,

    /// Delete the destination file when compression or decompression fails.
    #[serde(default = "default_remove_partial_output")]
    pub remove_partial_output: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            input_buffer_size: default_buffer_size(),
            output_buffer_size: default_buffer_size(),
            remove_partial_output: default_remove_partial_output(),
        }
    }
}

impl CodecConfig {
    /// Reject settings the pipelines cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.input_buffer_size == 0 {
            return Err(Error::invalid_config("input_buffer_size", "must be non-zero"));
        }
        if self.output_buffer_size == 0 {
            return Err(Error::invalid_config("output_buffer_size", "must be non-zero"));
        }
        Ok(())
    }
}

fn default_buffer_size() -> usize {
    64 * 1024
}

fn default_remove_partial_output() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.input_buffer_size, 65536);
        assert_eq!(config.output_buffer_size, 65536);
        assert!(config.remove_partial_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CodecConfig = serde_json::from_str(r#"{"input_buffer_size": 4096}"#).unwrap();
        assert_eq!(config.input_buffer_size, 4096);
        assert_eq!(config.output_buffer_size, 65536);
        assert!(config.remove_partial_output);
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let config = CodecConfig {
            output_buffer_size: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                field: "output_buffer_size",
                ..
            }
        ));
        assert!(!err.is_out_of_range());
    }
}
