//! `KP04` container header and entry record layout.
//!
//! ```text
//! Header:  magic "KP04" | version: u8 (4) | entryCount: u32
//! Entry:   pathLen: u16 | path | flags: u8 | originalSize: u64
//!          | storedSize: u64 | extLen: u16 | ext | payload[storedSize]
//! ```
//!
//! All integers are little-endian.

use crate::entry::ArchiveEntry;
use kittypress_codec::format::{FormatVersion, KP04_MAGIC, MAGIC_LEN};
use kittypress_core::cursor::SliceReader;
use kittypress_core::error::{KittyError, Result};

/// Container version byte.
pub const ARCHIVE_VERSION: u8 = 4;

/// Size of the fixed header.
pub const HEADER_SIZE: usize = MAGIC_LEN + 1 + 4;

/// Fixed archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Version byte as stored.
    pub version: u8,
    /// Number of entries that follow.
    pub entry_count: u32,
}

impl ArchiveHeader {
    /// Create a header for `entry_count` entries.
    pub fn new(entry_count: u32) -> Self {
        Self {
            version: ARCHIVE_VERSION,
            entry_count,
        }
    }

    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..MAGIC_LEN].copy_from_slice(&KP04_MAGIC);
        out[MAGIC_LEN] = self.version;
        out[MAGIC_LEN + 1..].copy_from_slice(&self.entry_count.to_le_bytes());
        out
    }

    /// Parse the header, rejecting payload generations with a clear error.
    pub fn parse(reader: &mut SliceReader<'_>) -> Result<Self> {
        let magic = reader.read_array::<MAGIC_LEN>("archive magic")?;
        match FormatVersion::from_magic(&magic) {
            Some(FormatVersion::V4) => {}
            Some(other) => {
                return Err(KittyError::unsupported_version(format!(
                    "{other} is a single-file payload, not a KP04 archive"
                )));
            }
            None => return Err(KittyError::invalid_magic(magic.to_vec())),
        }

        let version = reader.read_u8("archive version")?;
        if version != ARCHIVE_VERSION {
            log::warn!("archive version byte is {version}, expected {ARCHIVE_VERSION}");
        }
        let entry_count = reader.read_u32_le("entry count")?;
        Ok(Self {
            version,
            entry_count,
        })
    }
}

/// Serialize an entry record (everything before the payload).
pub fn write_entry_record(out: &mut Vec<u8>, entry: &ArchiveEntry) -> Result<()> {
    let path_len = u16::try_from(entry.path.len()).map_err(|_| {
        KittyError::invalid_header(format!("path longer than 65535 bytes: {}", entry.path))
    })?;
    let ext_len = u16::try_from(entry.extension.len()).map_err(|_| {
        KittyError::invalid_header(format!(
            "extension longer than 65535 bytes for {}",
            entry.path
        ))
    })?;

    out.extend_from_slice(&path_len.to_le_bytes());
    out.extend_from_slice(entry.path.as_bytes());
    out.push(entry.flags);
    out.extend_from_slice(&entry.original_size.to_le_bytes());
    out.extend_from_slice(&entry.stored_size.to_le_bytes());
    out.extend_from_slice(&ext_len.to_le_bytes());
    out.extend_from_slice(entry.extension.as_bytes());
    Ok(())
}

/// Parse an entry record and skip over its payload.
pub fn read_entry_record(reader: &mut SliceReader<'_>) -> Result<ArchiveEntry> {
    let path_len = reader.read_u16_le("entry path length")?;
    let path = reader.read_string(path_len as u64, "entry path")?;
    let flags = reader.read_u8("entry flags")?;
    let original_size = reader.read_u64_le("entry original size")?;
    let stored_size = reader.read_u64_le("entry stored size")?;
    let ext_len = reader.read_u16_le("entry extension length")?;
    let extension = reader.read_string(ext_len as u64, "entry extension")?;

    let payload_offset = reader.position() as u64;
    reader.read_slice(stored_size, "entry payload")?;

    Ok(ArchiveEntry {
        path,
        flags,
        original_size,
        stored_size,
        extension,
        payload_offset,
    })
}
