//! Whole-file compression pipeline.
//!
//! Compression streams the input through the LZ77 encoder in chunks,
//! serializes the tokens, Huffman-codes the token bytes and wraps the result
//! in a current-generation payload. When that payload would not be smaller
//! than the input, the input is stored raw instead.
//!
//! Decompression accepts every single-file generation.

use crate::config::CodecConfig;
use crate::format::{self, FormatVersion};
use crate::huffman;
use crate::lz77::Lz77Encoder;
use kittypress_core::error::{KittyError, Result};
use kittypress_core::{Codec, DecodedPayload};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Outcome of compressing one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSummary {
    /// Input size in bytes.
    pub original_size: u64,
    /// Payload size in bytes, header included.
    pub stored_size: u64,
    /// Whether the payload is entropy coded rather than raw.
    pub compressed: bool,
}

impl CompressionSummary {
    /// Percentage of the input saved, negative when the payload is larger.
    pub fn space_savings(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.stored_size as f64 / self.original_size as f64) * 100.0
    }

    /// Payload size divided by input size.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 1.0;
        }
        self.stored_size as f64 / self.original_size as f64
    }
}

/// Compress a buffer into a payload.
///
/// `extension` is recorded verbatim and should include its leading dot.
pub fn compress(data: &[u8], extension: &str, config: &CodecConfig) -> Result<Vec<u8>> {
    compress_with_summary(data, extension, config).map(|(payload, _)| payload)
}

/// Compress a buffer and report what was stored.
pub fn compress_with_summary(
    data: &[u8],
    extension: &str,
    config: &CodecConfig,
) -> Result<(Vec<u8>, CompressionSummary)> {
    let (payload, compressed) = match compressed_payload(data, extension, config)? {
        Some(payload) if payload.len() < data.len() => (payload, true),
        Some(payload) => {
            log::debug!(
                "compressed payload ({} bytes) not smaller than input ({} bytes), storing raw",
                payload.len(),
                data.len()
            );
            (format::encode_raw(extension, data), false)
        }
        None => (format::encode_raw(extension, data), false),
    };

    let summary = CompressionSummary {
        original_size: data.len() as u64,
        stored_size: payload.len() as u64,
        compressed,
    };
    Ok((payload, summary))
}

/// Build the LZ77 + Huffman payload, or `None` when only raw store applies.
fn compressed_payload(
    data: &[u8],
    extension: &str,
    config: &CodecConfig,
) -> Result<Option<Vec<u8>>> {
    if config.store_only {
        return Ok(None);
    }

    let mut encoder = Lz77Encoder::new(config.lz77);
    let mut token_bytes = Vec::with_capacity(data.len() / 2);
    for chunk in data.chunks(config.chunk_size.max(1)) {
        encoder.feed(chunk);
        token_bytes.extend(encoder.consume_output());
    }
    log::trace!(
        "LZ77: {} input bytes -> {} token bytes",
        data.len(),
        token_bytes.len()
    );

    let encoded = match huffman::encode(&token_bytes) {
        Ok(encoded) => encoded,
        Err(KittyError::EmptyInput) => return Ok(None),
        Err(e) => return Err(e),
    };
    log::trace!(
        "Huffman: {} symbols, {} bits",
        encoded.table.len(),
        encoded.bit_len
    );

    format::encode_compressed(extension, &encoded).map(Some)
}

/// Decode any single-file payload.
pub fn decompress(payload: &[u8]) -> Result<DecodedPayload> {
    format::decode_payload(payload)
}

/// The extension of `path` with a leading dot, or empty.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Append `extension` to `output` when `output` has none of its own.
pub fn final_output_path(output: &Path, extension: &str) -> PathBuf {
    if extension.is_empty() || output.extension().is_some() {
        return output.to_path_buf();
    }
    let mut name = output.as_os_str().to_os_string();
    name.push(extension);
    PathBuf::from(name)
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The destination only ever holds complete contents.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| KittyError::Io(e.error))?;
    Ok(())
}

/// Compress the file at `input` into a payload file at `output`.
pub fn compress_file(
    input: &Path,
    output: &Path,
    config: &CodecConfig,
) -> Result<CompressionSummary> {
    let data = fs::read(input)?;
    let extension = extension_of(input);
    let (payload, summary) = compress_with_summary(&data, &extension, config)?;
    write_atomically(output, &payload)?;
    log::info!(
        "{} -> {} ({} -> {} bytes, {:.1}% saved)",
        input.display(),
        output.display(),
        summary.original_size,
        summary.stored_size,
        summary.space_savings()
    );
    Ok(summary)
}

/// Decode the payload file at `input` and write the contents next to `output`.
///
/// The recorded extension is appended when `output` has none. Returns the
/// path actually written.
pub fn decompress_file(input: &Path, output: &Path) -> Result<PathBuf> {
    let payload = fs::read(input)?;
    let decoded = decompress(&payload)?;
    let target = final_output_path(output, &decoded.extension);
    write_atomically(&target, &decoded.data)?;
    log::info!(
        "{} -> {} ({} bytes, generation {})",
        input.display(),
        target.display(),
        decoded.data.len(),
        decoded.generation
    );
    Ok(target)
}

/// The LZ77 + Huffman codec behind the [`Codec`] seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct KittyCodec {
    config: CodecConfig,
}

impl KittyCodec {
    /// Create a codec with the given configuration.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl Codec for KittyCodec {
    fn name(&self) -> &'static str {
        "lz77+huffman"
    }

    fn compress(&self, data: &[u8], extension: &str) -> Result<Vec<u8>> {
        compress(data, extension, &self.config)
    }

    fn decompress(&self, payload: &[u8]) -> Result<DecodedPayload> {
        let decoded = decompress(payload)?;
        if decoded.generation != FormatVersion::CURRENT_PAYLOAD.generation() {
            log::debug!("decoded legacy generation {} payload", decoded.generation);
        }
        Ok(decoded)
    }
}
