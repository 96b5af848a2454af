//! `KP04` archive reading.

use crate::entry::ArchiveEntry;
use crate::header::{ArchiveHeader, read_entry_record};
use kittypress_codec::format::{FormatVersion, MAGIC_LEN};
use kittypress_core::cursor::SliceReader;
use kittypress_core::error::{KittyError, Result};
use kittypress_core::{Codec, DecodedPayload};

/// A parsed archive borrowing its bytes.
///
/// The whole entry table is parsed and bounds-checked up front.
#[derive(Debug, Clone)]
pub struct ArchiveReader<'a> {
    data: &'a [u8],
    header: ArchiveHeader,
    entries: Vec<ArchiveEntry>,
}

impl<'a> ArchiveReader<'a> {
    /// Parse an archive.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let mut reader = SliceReader::new(data);
        let header = ArchiveHeader::parse(&mut reader)?;

        // Each record is at least 21 bytes, which bounds a hostile count.
        let capacity = (header.entry_count as usize).min(reader.remaining() / 21);
        let mut entries = Vec::with_capacity(capacity);
        for _ in 0..header.entry_count {
            entries.push(read_entry_record(&mut reader)?);
        }

        if !reader.is_empty() {
            log::debug!("{} trailing bytes after last entry", reader.remaining());
        }

        Ok(Self {
            data,
            header,
            entries,
        })
    }

    /// The fixed header.
    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// Get entries.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// The stored payload of an entry.
    pub fn payload(&self, entry: &ArchiveEntry) -> Result<&'a [u8]> {
        let start = usize::try_from(entry.payload_offset).map_err(|_| {
            KittyError::corrupted(entry.payload_offset, "payload offset out of range")
        })?;
        let len = usize::try_from(entry.stored_size)
            .map_err(|_| KittyError::allocation(entry.stored_size))?;
        start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| {
                KittyError::truncated(format!("payload of {}", entry.path), entry.stored_size)
            })
    }

    /// Decode an entry's payload with `codec`.
    ///
    /// An entry without the payload flag decodes to an empty file.
    pub fn decode<C: Codec>(&self, entry: &ArchiveEntry, codec: &C) -> Result<DecodedPayload> {
        if !entry.has_payload() {
            return Ok(DecodedPayload {
                generation: 4,
                compressed: false,
                extension: entry.extension.clone(),
                data: Vec::new(),
            });
        }

        let decoded = codec.decompress(self.payload(entry)?)?;
        if decoded.data.len() as u64 != entry.original_size {
            log::warn!(
                "{}: decoded {} bytes, header says {}",
                entry.path,
                decoded.data.len(),
                entry.original_size
            );
        }
        Ok(decoded)
    }

    /// Name of the method an entry's payload was stored with.
    ///
    /// Reads only the payload's magic and flag byte.
    pub fn method(&self, entry: &ArchiveEntry) -> Result<&'static str> {
        if !entry.has_payload() {
            return Ok("empty");
        }
        let payload = self.payload(entry)?;
        let version = FormatVersion::detect(payload)?;
        let compressed = match version {
            FormatVersion::V1 => true,
            FormatVersion::V4 => {
                return Err(KittyError::unsupported_version(format!(
                    "{}: nested KP04 archive",
                    entry.path
                )));
            }
            _ => payload.get(MAGIC_LEN).is_some_and(|flag| *flag != 0),
        };
        Ok(match (compressed, version.uses_lz77()) {
            (false, _) => "store",
            (true, false) => "huffman",
            (true, true) => "lz77",
        })
    }

    /// Find an entry by path.
    pub fn find(&self, path: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Total original size of all entries.
    pub fn total_original_size(&self) -> u64 {
        self.entries.iter().map(|e| e.original_size).sum()
    }

    /// Total stored size of all entries.
    pub fn total_stored_size(&self) -> u64 {
        self.entries.iter().map(|e| e.stored_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::write_entry_record;
    use crate::writer::ArchiveWriter;
    use kittypress_codec::KittyCodec;

    #[test]
    fn test_read_entries() {
        let mut writer = ArchiveWriter::new(KittyCodec::default(), 2);
        writer
            .add_file("dir/one.txt", "txt", &b"one one one one one".repeat(10))
            .unwrap();
        writer.add_file("dir/two", "", b"2").unwrap();
        let bytes = writer.finish().unwrap();

        let reader = ArchiveReader::new(&bytes).unwrap();
        assert_eq!(reader.header().entry_count, 2);
        assert_eq!(reader.entries().len(), 2);

        let codec = KittyCodec::default();
        let one = reader.find("dir/one.txt").unwrap();
        let decoded = reader.decode(one, &codec).unwrap();
        assert_eq!(decoded.data, b"one one one one one".repeat(10));
        assert_eq!(decoded.extension, ".txt");

        let two = reader.find("dir/two").unwrap();
        assert_eq!(reader.decode(two, &codec).unwrap().data, b"2");
        assert_eq!(reader.total_original_size(), 191);
        assert_eq!(reader.method(one).unwrap(), "lz77");
        assert_eq!(reader.method(two).unwrap(), "store");
    }

    #[test]
    fn test_entry_without_payload_flag() {
        let mut bytes = ArchiveHeader::new(1).to_bytes().to_vec();
        let mut entry = ArchiveEntry::new("empty.txt", "txt");
        entry.flags = 0;
        write_entry_record(&mut bytes, &entry).unwrap();

        let reader = ArchiveReader::new(&bytes).unwrap();
        let entry = &reader.entries()[0];
        assert!(!entry.has_payload());
        assert!(reader.decode(entry, &KittyCodec::default()).unwrap().data.is_empty());
        assert_eq!(reader.method(entry).unwrap(), "empty");
    }

    #[test]
    fn test_count_larger_than_entries() {
        let bytes = ArchiveHeader::new(1_000_000).to_bytes();
        assert!(matches!(
            ArchiveReader::new(&bytes),
            Err(KittyError::Truncated { .. })
        ));
    }
}
