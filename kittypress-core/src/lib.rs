//! # KittyPress Core
//!
//! Core components for the KittyPress compressor.
//!
//! This crate provides the fundamental building blocks shared by the codec
//! and the archive container:
//!
//! - [`bitstream`]: MSB-first bit-level I/O for Huffman codes
//! - [`cursor`]: Bounds-checked little-endian header parsing
//! - [`traits`]: The [`Codec`] seam and compression levels
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! KittyPress is organized as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     kittypress create / extract / list / test / detect  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     KP04 multi-file archive, extraction root policy     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     LZ77 + Huffman, KP01..KP03 single-file payloads     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     BitReader/BitWriter, SliceReader, errors, traits    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use kittypress_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b110, 3).unwrap();
//! let bytes = writer.into_inner().unwrap();
//! assert_eq!(bytes, vec![0b1100_0000]);
//!
//! let mut reader = BitReader::new(Cursor::new(bytes));
//! assert_eq!(reader.read_bits(3).unwrap(), Some(0b110));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod cursor;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use cursor::SliceReader;
pub use error::{KittyError, Result, try_alloc};
pub use traits::{Codec, CompressionLevel, DecodedPayload};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::cursor::SliceReader;
    pub use crate::error::{KittyError, Result};
    pub use crate::traits::{Codec, CompressionLevel, DecodedPayload};
}
