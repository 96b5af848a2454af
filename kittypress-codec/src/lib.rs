//! # KittyPress Codec
//!
//! LZ77 + Huffman compression for single files.
//!
//! A file is turned into a self-describing payload: a magic naming the
//! format generation, the original extension, and either the raw bytes or a
//! Huffman code table plus bit stream over serialized LZ77 tokens.
//!
//! ## Features
//!
//! - **Compression**: streaming LZ77 with a 64 KiB window
//!   - Hash-chain search (default) or exhaustive search
//!   - One-step lazy matching
//!   - Raw store fallback when coding would not shrink the input
//! - **Decompression**: every single-file generation (`KP01`-`KP03`)
//!
//! ## Example
//!
//! ```rust
//! use kittypress_codec::{CodecConfig, compress, decompress};
//!
//! let original = b"Hello, World! Hello, World! Hello, World!";
//! let payload = compress(original, ".txt", &CodecConfig::default()).unwrap();
//!
//! let decoded = decompress(&payload).unwrap();
//! assert_eq!(decoded.data, original);
//! assert_eq!(decoded.extension, ".txt");
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (raw store)
//! - Level 1-3: Shallow hash chain
//! - Level 4-6: Balanced (default is 6)
//! - Level 7-9: Deep hash chain (slower)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod format;
pub mod huffman;
pub mod lz77;
pub mod pipeline;

// Re-exports
pub use config::{CodecConfig, Lz77Config, SearchStrategy};
pub use format::{FormatVersion, PayloadParser, decode_payload, parser_for};
pub use huffman::{Code, CodeTable, HuffmanEncoded, HuffmanTree};
pub use lz77::{Lz77Encoder, Lz77Token};
pub use pipeline::{
    CompressionSummary, KittyCodec, compress, compress_file, compress_with_summary, decompress,
    decompress_file, extension_of, final_output_path, write_atomically,
};
