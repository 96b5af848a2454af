//! Error types for KittyPress operations.
//!
//! A single error enum covers the I/O failures, malformed payloads and
//! containers, and buffer sizing failures that the codec and archive layers
//! can surface. Use [`KittyError::is_format_error`] to tell malformed input
//! apart from environmental failures.

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// The main error type for KittyPress operations.
#[derive(Debug, Error)]
pub enum KittyError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unknown magic number at the start of a payload or archive.
    #[error("Invalid magic number: found {found:02x?}")]
    InvalidMagic {
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// A recognized generation that cannot be decoded in this context.
    #[error("Unsupported format version: {message}")]
    UnsupportedVersion {
        /// Description of why the version was rejected.
        message: String,
    },

    /// Header or payload ended before a declared field was complete.
    #[error("Truncated {context}: expected {expected} more bytes")]
    Truncated {
        /// What was being read.
        context: String,
        /// Number of bytes that were expected but not available.
        expected: u64,
    },

    /// Invalid header format.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Bit sequence matched no code in the table.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Invalid distance in an LZ77 back-reference.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Number of bytes produced so far.
        history_size: usize,
    },

    /// Corrupted data in a payload.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte (or bit, where noted) offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Path traversal attempt (absolute path or `..` component) in an entry.
    #[error("Path traversal detected in entry: {path}")]
    PathTraversal {
        /// The suspicious path.
        path: String,
    },

    /// Two inputs map to the same relative path inside one archive.
    #[error("Duplicate archive entry: {path}")]
    DuplicateEntry {
        /// The repeated relative path.
        path: String,
    },

    /// The entropy coder was asked to encode an empty buffer.
    #[error("Cannot entropy-code empty input")]
    EmptyInput,

    /// A buffer could not be sized for the requested length.
    #[error("Allocation failed for {requested} bytes")]
    Allocation {
        /// Number of bytes requested.
        requested: u64,
    },
}

/// Result type alias for KittyPress operations.
pub type Result<T> = std::result::Result<T, KittyError>;

impl KittyError {
    /// Create an invalid magic error.
    pub fn invalid_magic(found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            found: found.into(),
        }
    }

    /// Create an unsupported version error.
    pub fn unsupported_version(message: impl Into<String>) -> Self {
        Self::UnsupportedVersion {
            message: message.into(),
        }
    }

    /// Create a truncation error.
    pub fn truncated(context: impl Into<String>, expected: u64) -> Self {
        Self::Truncated {
            context: context.into(),
            expected,
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create a path traversal error.
    pub fn path_traversal(path: impl Into<String>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Create a duplicate entry error.
    pub fn duplicate_entry(path: impl Into<String>) -> Self {
        Self::DuplicateEntry { path: path.into() }
    }

    /// Create an allocation error.
    pub fn allocation(requested: u64) -> Self {
        Self::Allocation { requested }
    }

    /// Whether this error describes malformed or unsupported input data.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic { .. }
                | Self::UnsupportedVersion { .. }
                | Self::Truncated { .. }
                | Self::InvalidHeader { .. }
                | Self::InvalidHuffmanCode { .. }
                | Self::InvalidDistance { .. }
                | Self::CorruptedData { .. }
                | Self::PathTraversal { .. }
                | Self::DuplicateEntry { .. }
        )
    }
}

impl From<TryReserveError> for KittyError {
    fn from(_: TryReserveError) -> Self {
        // The std error does not expose the requested size.
        Self::Allocation { requested: 0 }
    }
}

/// Reserve `len` bytes in a fresh vector, mapping failure to [`KittyError::Allocation`].
pub fn try_alloc(len: u64) -> Result<Vec<u8>> {
    let len_usize = usize::try_from(len).map_err(|_| KittyError::allocation(len))?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len_usize)
        .map_err(|_| KittyError::allocation(len))?;
    Ok(buf)
}
