//! Format auto-detection.
//!
//! Classifies a file by its magic number as one of the KittyPress
//! generations, mirroring how archive tools sniff signatures before choosing
//! a reader.

use kittypress_codec::format::{FormatVersion, MAGIC_LEN};
use kittypress_core::error::Result;
use std::io::Read;

/// What a file's leading bytes identify it as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// A single-file payload of the given generation.
    Payload(FormatVersion),
    /// A `KP04` multi-file archive.
    Archive,
    /// Not a KittyPress file.
    Unknown,
}

impl ArchiveFormat {
    /// Detect format from magic bytes.
    pub fn from_magic(magic: &[u8]) -> Self {
        match magic.get(..MAGIC_LEN).and_then(FormatVersion::from_magic) {
            Some(FormatVersion::V4) => Self::Archive,
            Some(version) => Self::Payload(version),
            None => Self::Unknown,
        }
    }

    /// Detect format from a reader.
    pub fn detect<R: Read>(reader: &mut R) -> Result<(Self, Vec<u8>)> {
        let mut magic = Vec::with_capacity(MAGIC_LEN);
        reader.take(MAGIC_LEN as u64).read_to_end(&mut magic)?;
        Ok((Self::from_magic(&magic), magic))
    }

    /// The generation number, if known.
    pub fn generation(&self) -> Option<u8> {
        match self {
            Self::Payload(version) => Some(version.generation()),
            Self::Archive => Some(FormatVersion::V4.generation()),
            Self::Unknown => None,
        }
    }

    /// Check if this is a single-file payload.
    pub fn is_payload(&self) -> bool {
        matches!(self, Self::Payload(_))
    }

    /// Check if this is an archive format (multiple files).
    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive)
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Payload(FormatVersion::V1) => write!(f, "KP01 payload (Huffman)"),
            Self::Payload(FormatVersion::V2) => write!(f, "KP02 payload (Huffman, extension)"),
            Self::Payload(version) => write!(f, "{version} payload (LZ77 + Huffman)"),
            Self::Archive => write!(f, "KP04 archive"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
