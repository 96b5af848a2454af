//! Payload format generations and the parser registry.
//!
//! Every payload starts with a 4-byte magic naming its generation:
//!
//! | Magic  | Generation | Layout                                               |
//! |--------|------------|------------------------------------------------------|
//! | `KP01` | 1          | ASCII code table, Huffman over the file bytes        |
//! | `KP02` | 2          | extension, raw store or ASCII-table Huffman          |
//! | `KP03` | 3          | extension, raw store or packed-table Huffman over LZ77 tokens |
//! | `KP04` | 4          | multi-file container (handled by the archive crate)  |
//!
//! All integers are little-endian. Generation 2 and 3 headers share this
//! shape:
//!
//! ```text
//! magic[4] | flag: u8 | extLen: u64 | ext[extLen]
//!   flag == 0: rawSize: u64 | raw[rawSize]
//!   otherwise: code table | encodedBitLen: u64 | bits
//! ```
//!
//! Decoding dispatches on the magic through a fixed table of
//! [`PayloadParser`]s. Writers only ever produce the current generation.

use crate::huffman::{self, CodeTable, HuffmanEncoded};
use crate::lz77;
use kittypress_core::cursor::SliceReader;
use kittypress_core::error::{KittyError, Result};
use kittypress_core::{DecodedPayload, try_alloc};
use std::fmt;

/// Length of every magic number.
pub const MAGIC_LEN: usize = 4;

/// Generation 1 magic.
pub const KP01_MAGIC: [u8; 4] = *b"KP01";
/// Generation 2 magic.
pub const KP02_MAGIC: [u8; 4] = *b"KP02";
/// Generation 3 magic.
pub const KP03_MAGIC: [u8; 4] = *b"KP03";
/// Container magic.
pub const KP04_MAGIC: [u8; 4] = *b"KP04";

/// Mode flag for a raw-stored payload.
pub const FLAG_RAW: u8 = 0;
/// Mode flag for a Huffman-coded payload.
pub const FLAG_COMPRESSED: u8 = 1;

/// A format generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatVersion {
    /// Huffman only, no extension.
    V1,
    /// Extension plus raw or Huffman.
    V2,
    /// Extension plus raw or LZ77 + Huffman.
    V3,
    /// Multi-file container.
    V4,
}

impl FormatVersion {
    /// Generation written for single-file payloads.
    pub const CURRENT_PAYLOAD: Self = Self::V3;

    /// Every known generation, oldest first.
    pub const ALL: [Self; 4] = [Self::V1, Self::V2, Self::V3, Self::V4];

    /// The magic bytes for this generation.
    pub fn magic(&self) -> [u8; 4] {
        match self {
            Self::V1 => KP01_MAGIC,
            Self::V2 => KP02_MAGIC,
            Self::V3 => KP03_MAGIC,
            Self::V4 => KP04_MAGIC,
        }
    }

    /// Generation number (1-4).
    pub fn generation(&self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
        }
    }

    /// Look up a generation by its magic.
    pub fn from_magic(magic: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.magic() == magic)
    }

    /// Identify the generation of a buffer from its leading magic.
    pub fn detect(data: &[u8]) -> Result<Self> {
        let Some(magic) = data.get(..MAGIC_LEN) else {
            return Err(KittyError::truncated(
                "magic number",
                (MAGIC_LEN - data.len()) as u64,
            ));
        };
        Self::from_magic(magic).ok_or_else(|| KittyError::invalid_magic(magic))
    }

    /// Whether this generation is the multi-file container.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::V4)
    }

    /// Whether payloads of this generation record the file extension.
    pub fn has_extension(&self) -> bool {
        !matches!(self, Self::V1)
    }

    /// Whether payloads of this generation run LZ77 before Huffman.
    pub fn uses_lz77(&self) -> bool {
        matches!(self, Self::V3)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magic = self.magic();
        write!(f, "{}", String::from_utf8_lossy(&magic))
    }
}

/// A decoder for one single-file payload generation.
pub trait PayloadParser: Sync {
    /// The generation this parser handles.
    fn version(&self) -> FormatVersion;

    /// Parse the payload body that follows the magic.
    fn parse(&self, body: &mut SliceReader<'_>) -> Result<DecodedPayload>;
}

/// Generation 1: ASCII table, Huffman over raw bytes.
struct Kp01Parser;

/// Generation 2: extension, raw or ASCII-table Huffman.
struct Kp02Parser;

/// Generation 3: extension, raw or packed-table Huffman over LZ77 tokens.
struct Kp03Parser;

static PARSERS: [&dyn PayloadParser; 3] = [&Kp01Parser, &Kp02Parser, &Kp03Parser];

/// The parser registered for a generation, if it is a single-file payload.
pub fn parser_for(version: FormatVersion) -> Option<&'static dyn PayloadParser> {
    PARSERS.iter().copied().find(|p| p.version() == version)
}

/// Read `encodedBitLen` and decode the bit stream that fills the rest of the body.
fn read_huffman_body(body: &mut SliceReader<'_>, table: &CodeTable) -> Result<Vec<u8>> {
    let bit_len = body.read_u64_le("encoded bit length")?;
    let bits = body.read_slice(body.remaining() as u64, "encoded bits")?;
    huffman::decode(table, bit_len, bits)
}

/// Read the mode flag and the extension shared by generations 2 and 3.
///
/// Any non-zero flag means compressed.
fn read_extended_header(body: &mut SliceReader<'_>) -> Result<(bool, String)> {
    let compressed = body.read_u8("mode flag")? != FLAG_RAW;
    let ext_len = body.read_u64_le("extension length")?;
    let extension = body.read_string(ext_len, "extension")?;
    Ok((compressed, extension))
}

fn read_raw(body: &mut SliceReader<'_>) -> Result<Vec<u8>> {
    let size = body.read_u64_le("raw size")?;
    let raw = body.read_slice(size, "raw payload")?;
    let mut data = try_alloc(size)?;
    data.extend_from_slice(raw);
    Ok(data)
}

impl PayloadParser for Kp01Parser {
    fn version(&self) -> FormatVersion {
        FormatVersion::V1
    }

    fn parse(&self, body: &mut SliceReader<'_>) -> Result<DecodedPayload> {
        let table = CodeTable::read_legacy(body)?;
        let data = read_huffman_body(body, &table)?;
        Ok(DecodedPayload {
            generation: 1,
            compressed: true,
            extension: String::new(),
            data,
        })
    }
}

impl PayloadParser for Kp02Parser {
    fn version(&self) -> FormatVersion {
        FormatVersion::V2
    }

    fn parse(&self, body: &mut SliceReader<'_>) -> Result<DecodedPayload> {
        let (compressed, extension) = read_extended_header(body)?;
        let data = if compressed {
            let table = CodeTable::read_legacy(body)?;
            read_huffman_body(body, &table)?
        } else {
            read_raw(body)?
        };
        Ok(DecodedPayload {
            generation: 2,
            compressed,
            extension,
            data,
        })
    }
}

impl PayloadParser for Kp03Parser {
    fn version(&self) -> FormatVersion {
        FormatVersion::V3
    }

    fn parse(&self, body: &mut SliceReader<'_>) -> Result<DecodedPayload> {
        let (compressed, extension) = read_extended_header(body)?;
        let data = if compressed {
            let table = CodeTable::read_packed(body)?;
            let token_bytes = read_huffman_body(body, &table)?;
            let tokens = lz77::deserialize(&token_bytes);
            lz77::decompress(&tokens)?
        } else {
            read_raw(body)?
        };
        Ok(DecodedPayload {
            generation: 3,
            compressed,
            extension,
            data,
        })
    }
}

/// Decode any single-file payload generation.
///
/// A container magic is rejected with [`KittyError::UnsupportedVersion`].
pub fn decode_payload(payload: &[u8]) -> Result<DecodedPayload> {
    let version = FormatVersion::detect(payload)?;
    let parser = parser_for(version).ok_or_else(|| {
        KittyError::unsupported_version(format!(
            "{version} is a multi-file archive, not a single-file payload"
        ))
    })?;

    let mut body = SliceReader::new(&payload[MAGIC_LEN..]);
    parser.parse(&mut body)
}

fn write_extended_header(out: &mut Vec<u8>, flag: u8, extension: &str) {
    out.extend_from_slice(&FormatVersion::CURRENT_PAYLOAD.magic());
    out.push(flag);
    out.extend_from_slice(&(extension.len() as u64).to_le_bytes());
    out.extend_from_slice(extension.as_bytes());
}

/// Build a current-generation raw payload.
pub fn encode_raw(extension: &str, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAGIC_LEN + 17 + extension.len() + data.len());
    write_extended_header(&mut out, FLAG_RAW, extension);
    out.extend_from_slice(&(data.len() as u64).to_le_bytes());
    out.extend_from_slice(data);
    out
}

/// Build a current-generation compressed payload around Huffman-coded tokens.
pub fn encode_compressed(extension: &str, encoded: &HuffmanEncoded) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(
        MAGIC_LEN + 17 + extension.len() + encoded.table.packed_len() + encoded.bits.len(),
    );
    write_extended_header(&mut out, FLAG_COMPRESSED, extension);
    encoded.table.write_packed(&mut out)?;
    out.extend_from_slice(&encoded.bit_len.to_le_bytes());
    out.extend_from_slice(&encoded.bits);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(FormatVersion::detect(b"KP01xxxx").unwrap(), FormatVersion::V1);
        assert_eq!(FormatVersion::detect(b"KP04").unwrap(), FormatVersion::V4);
        assert!(matches!(
            FormatVersion::detect(b"KP99...."),
            Err(KittyError::InvalidMagic { .. })
        ));
        assert!(matches!(
            FormatVersion::detect(b"KP"),
            Err(KittyError::Truncated { expected: 2, .. })
        ));
    }

    #[test]
    fn test_registry_covers_payload_generations() {
        for version in FormatVersion::ALL {
            assert_eq!(parser_for(version).is_some(), !version.is_container());
        }
        assert_eq!(FormatVersion::V3.to_string(), "KP03");
    }

    #[test]
    fn test_container_rejected_as_payload() {
        let mut data = KP04_MAGIC.to_vec();
        data.push(4);
        data.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            decode_payload(&data),
            Err(KittyError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_raw_layout() {
        let payload = encode_raw(".bin", &[0xAB]);
        let mut expected = b"KP03".to_vec();
        expected.push(FLAG_RAW);
        expected.extend_from_slice(&4u64.to_le_bytes());
        expected.extend_from_slice(b".bin");
        expected.extend_from_slice(&1u64.to_le_bytes());
        expected.push(0xAB);
        assert_eq!(payload, expected);

        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.generation, 3);
        assert!(!decoded.compressed);
        assert_eq!(decoded.extension, ".bin");
        assert_eq!(decoded.data, vec![0xAB]);
    }

    #[test]
    fn test_kp01_legacy_payload() {
        let data = b"banana bandana";
        let encoded = huffman::encode(data).unwrap();
        let mut payload = KP01_MAGIC.to_vec();
        encoded.table.write_legacy(&mut payload);
        payload.extend_from_slice(&encoded.bit_len.to_le_bytes());
        payload.extend_from_slice(&encoded.bits);

        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.generation, 1);
        assert!(decoded.compressed);
        assert_eq!(decoded.extension, "");
        assert_eq!(decoded.data, data);
    }

    #[test]
    fn test_kp02_legacy_payloads() {
        let data = b"legacy generation two";
        let encoded = huffman::encode(data).unwrap();
        let mut payload = KP02_MAGIC.to_vec();
        payload.push(FLAG_COMPRESSED);
        payload.extend_from_slice(&4u64.to_le_bytes());
        payload.extend_from_slice(b".txt");
        encoded.table.write_legacy(&mut payload);
        payload.extend_from_slice(&encoded.bit_len.to_le_bytes());
        payload.extend_from_slice(&encoded.bits);

        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.generation, 2);
        assert_eq!(decoded.extension, ".txt");
        assert_eq!(decoded.data, data);

        let mut raw = KP02_MAGIC.to_vec();
        raw.push(FLAG_RAW);
        raw.extend_from_slice(&0u64.to_le_bytes());
        raw.extend_from_slice(&3u64.to_le_bytes());
        raw.extend_from_slice(b"xyz");
        let decoded = decode_payload(&raw).unwrap();
        assert!(!decoded.compressed);
        assert_eq!(decoded.data, b"xyz");
    }

    #[test]
    fn test_nonzero_flag_means_compressed() {
        let mut payload = KP03_MAGIC.to_vec();
        payload.push(7);
        payload.extend_from_slice(&0u64.to_le_bytes());
        // A code table must follow, so the body is short.
        assert!(matches!(
            decode_payload(&payload),
            Err(KittyError::Truncated { .. })
        ));
    }

    #[test]
    fn test_truncated_raw_payload() {
        let mut payload = encode_raw("", b"hello");
        payload.truncate(payload.len() - 2);
        assert!(matches!(
            decode_payload(&payload),
            Err(KittyError::Truncated { expected: 2, .. })
        ));
    }
}
