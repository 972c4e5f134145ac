//! Failure taxonomy shared by every HAFF crate.
//!
//! Three kinds of failure are kept apart: misuse of a container by the
//! caller ([`Error::OutOfRange`]), I/O trouble ([`Error::Open`],
//! [`Error::Io`]), and input that is not a valid HAFF container
//! ([`Error::is_malformed_input`]).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the HAFF crates.
pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong while compressing or decompressing.
#[derive(Debug, Error)]
pub enum Error {
    /// Index, position, or range outside a container's valid bounds.
    ///
    /// Signals misuse of a container by the caller; never produced by
    /// well-formed external input.
    #[error("out of range: {what}")]
    OutOfRange { what: &'static str },

    /// A source or destination path could not be opened.
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),

    /// Container does not start with the `HAFF` magic bytes.
    #[error("invalid magic: expected \"HAFF\", found {found:02x?}")]
    InvalidMagic { found: [u8; 4] },

    /// Code table or payload is inconsistent.
    #[error("malformed container: {message}")]
    CorruptedData {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Container ends before its preamble is complete.
    #[error("container truncated at byte {bytes_read}")]
    UnexpectedEof { bytes_read: usize },

    /// A [`CodecConfig`](crate::CodecConfig) setting the pipelines cannot run with.
    #[error("invalid config {field}: {message}")]
    InvalidConfig {
        field: &'static str,
        message: &'static str,
    },

    /// Caller-supplied output slice cannot hold the result.
    #[error("output buffer holds {provided} bytes, {required} needed")]
    BufferTooSmall { required: usize, provided: usize },
}

impl Error {
    /// Create an out-of-range error naming the violated bound.
    pub fn out_of_range(what: &'static str) -> Self {
        Error::OutOfRange { what }
    }

    /// Failure to open `path`.
    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Open {
            path: path.into(),
            source,
        }
    }

    /// Malformed container without positional context.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Error::CorruptedData {
            message: message.into(),
            source: None,
        }
    }

    /// Malformed container, noting the byte offset where the problem was seen.
    pub fn corrupted_at(message: impl Into<String>, offset: usize) -> Self {
        let mut message = message.into();
        message.push_str(&format!(" (offset {offset})"));
        Error::CorruptedData {
            message,
            source: None,
        }
    }

    /// Create a buffer-too-small error for the `*_to` APIs.
    pub fn buffer_too_small(required: usize, provided: usize) -> Self {
        Error::BufferTooSmall { required, provided }
    }

    /// Create a truncation error at byte `bytes_read` of the container.
    pub fn unexpected_eof(bytes_read: usize) -> Self {
        Error::UnexpectedEof { bytes_read }
    }

    /// Create an invalid-config error for `field`.
    pub fn invalid_config(field: &'static str, message: &'static str) -> Self {
        Error::InvalidConfig { field, message }
    }

    /// Whether the input was not a valid container.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidMagic { .. } | Error::CorruptedData { .. } | Error::UnexpectedEof { .. }
        )
    }

    /// Whether a container was used outside its bounds.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::OutOfRange { .. })
    }

    /// Stable label for logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Error::OutOfRange { .. } => "out_of_range",
            Error::Open { .. } | Error::Io(_) => "io_error",
            Error::InvalidMagic { .. } => "invalid_magic",
            Error::CorruptedData { .. } => "corrupted_data",
            Error::UnexpectedEof { .. } => "unexpected_eof",
            Error::InvalidConfig { .. } => "invalid_config",
            Error::BufferTooSmall { .. } => "buffer_too_small",
        }
    }
}
