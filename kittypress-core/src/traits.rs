//! Core traits for payload coding.
//!
//! This module defines the seam between the archive container and the codec
//! that turns one file's bytes into a self-describing payload. The archive
//! layer only ever talks to a [`Codec`], so an alternate backend can be
//! substituted without touching the container format.

use crate::error::Result;

/// A decoded single-file payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Format generation the payload was written in (1-3).
    pub generation: u8,
    /// Whether the payload was entropy coded (`false` for raw store).
    pub compressed: bool,
    /// Original file extension, including the leading dot (may be empty).
    pub extension: String,
    /// The restored file contents.
    pub data: Vec<u8>,
}

/// A whole-buffer payload codec.
///
/// Implementations must be deterministic and hold no state between calls:
/// every call to [`Codec::compress`] depends only on its arguments.
pub trait Codec {
    /// Short human-readable name of the backend.
    fn name(&self) -> &'static str;

    /// Compress a file's contents into a complete single-file payload.
    ///
    /// # Arguments
    ///
    /// * `data` - The file contents
    /// * `extension` - The file's extension with its leading dot, or empty
    fn compress(&self, data: &[u8], extension: &str) -> Result<Vec<u8>>;

    /// Decode a complete single-file payload.
    fn decompress(&self, payload: &[u8]) -> Result<DecodedPayload>;
}

impl<C: Codec + ?Sized> Codec for &C {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compress(&self, data: &[u8], extension: &str) -> Result<Vec<u8>> {
        (**self).compress(data, extension)
    }

    fn decompress(&self, payload: &[u8]) -> Result<DecodedPayload> {
        (**self).decompress(payload)
    }
}

/// Compression level for codecs that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression (always raw store).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Create a custom compression level (0-9).
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }

    /// Whether this level disables entropy coding entirely.
    pub fn is_store(&self) -> bool {
        self.0 == 0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_level() {
        assert_eq!(CompressionLevel::NONE.level(), 0);
        assert_eq!(CompressionLevel::FAST.level(), 1);
        assert_eq!(CompressionLevel::DEFAULT.level(), 6);
        assert_eq!(CompressionLevel::BEST.level(), 9);
        assert!(CompressionLevel::NONE.is_store());

        // Test clamping
        assert_eq!(CompressionLevel::new(100).level(), 9);
        assert_eq!(CompressionLevel::default(), CompressionLevel::DEFAULT);
    }

    struct Identity;

    impl Codec for Identity {
        fn name(&self) -> &'static str {
            "identity"
        }

        fn compress(&self, data: &[u8], _extension: &str) -> Result<Vec<u8>> {
            Ok(data.to_vec())
        }

        fn decompress(&self, payload: &[u8]) -> Result<DecodedPayload> {
            Ok(DecodedPayload {
                generation: 3,
                compressed: false,
                extension: String::new(),
                data: payload.to_vec(),
            })
        }
    }

    #[test]
    fn test_codec_by_reference() {
        fn roundtrip<C: Codec>(codec: C, data: &[u8]) -> Vec<u8> {
            let payload = codec.compress(data, ".txt").unwrap();
            codec.decompress(&payload).unwrap().data
        }

        let codec = Identity;
        assert_eq!(roundtrip(&codec, b"abc"), b"abc");
        assert_eq!((&codec).name(), "identity");
    }
}
