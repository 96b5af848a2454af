//! `KP04` archive creation.

use crate::entry::{ArchiveEntry, validate_extension, validate_relative_path};
use crate::header::{ArchiveHeader, write_entry_record};
use crate::observer::{ArchiveObserver, SilentObserver};
use crate::walk::collect_inputs;
use kittypress_codec::{CodecConfig, KittyCodec, write_atomically};
use kittypress_core::Codec;
use kittypress_core::error::{KittyError, Result};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::Path;

/// Builds an archive in memory, one entry at a time.
///
/// The entry count is fixed up front because it precedes the entries in the
/// header; [`ArchiveWriter::finish`] checks that exactly that many were added.
pub struct ArchiveWriter<C: Codec> {
    codec: C,
    buffer: Vec<u8>,
    expected: u32,
    entries: Vec<ArchiveEntry>,
    seen: FxHashSet<String>,
}

impl<C: Codec> ArchiveWriter<C> {
    /// Start an archive that will hold `entry_count` entries.
    pub fn new(codec: C, entry_count: u32) -> Self {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&ArchiveHeader::new(entry_count).to_bytes());
        Self {
            codec,
            buffer,
            expected: entry_count,
            entries: Vec::with_capacity(entry_count as usize),
            seen: FxHashSet::default(),
        }
    }

    /// Entries added so far.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Compress `data` and append it as an entry.
    ///
    /// `extension` is stored without a leading dot.
    pub fn add_file(&mut self, path: &str, extension: &str, data: &[u8]) -> Result<&ArchiveEntry> {
        validate_relative_path(path)?;
        validate_extension(extension)?;
        if !self.seen.insert(path.to_string()) {
            return Err(KittyError::duplicate_entry(path));
        }
        if self.entries.len() as u64 >= self.expected as u64 {
            return Err(KittyError::invalid_header(format!(
                "archive was declared with {} entries",
                self.expected
            )));
        }

        let payload_extension = if extension.is_empty() {
            String::new()
        } else {
            format!(".{extension}")
        };
        let payload = self.codec.compress(data, &payload_extension)?;

        let mut entry =
            ArchiveEntry::new(path, extension).with_sizes(data.len() as u64, payload.len() as u64);
        write_entry_record(&mut self.buffer, &entry)?;
        entry.payload_offset = self.buffer.len() as u64;
        self.buffer.extend_from_slice(&payload);

        log::debug!(
            "added {} ({} -> {} bytes) with {}",
            entry.path,
            entry.original_size,
            entry.stored_size,
            self.codec.name()
        );
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.entries.len() as u64 != self.expected as u64 {
            return Err(KittyError::invalid_header(format!(
                "archive declared {} entries but {} were added",
                self.expected,
                self.entries.len()
            )));
        }
        Ok(self.buffer)
    }
}

/// Build an archive from files and directories with the default codec.
pub fn create_archive<P: AsRef<Path>>(paths: &[P], config: &CodecConfig) -> Result<Vec<u8>> {
    create_archive_with(paths, KittyCodec::new(*config), SilentObserver)
}

/// Build an archive from files and directories.
pub fn create_archive_with<P, C, O>(paths: &[P], codec: C, mut observer: O) -> Result<Vec<u8>>
where
    P: AsRef<Path>,
    C: Codec,
    O: ArchiveObserver,
{
    let inputs = collect_inputs(paths)?;
    let count = u32::try_from(inputs.len())
        .map_err(|_| KittyError::invalid_header("more than u32::MAX entries"))?;
    log::debug!("creating archive with {count} file(s)");

    observer.begin(inputs.len());
    let mut writer = ArchiveWriter::new(codec, count);
    for input in &inputs {
        let data = fs::read(&input.source)?;
        let entry = writer.add_file(&input.relative, &input.extension, &data)?;
        observer.entry_added(entry);
    }
    let bytes = writer.finish()?;
    observer.finish();
    Ok(bytes)
}

/// Build an archive and write it to `output`.
///
/// The archive file is replaced atomically; nothing is written on failure.
pub fn write_archive<P, C, O>(output: &Path, paths: &[P], codec: C, observer: O) -> Result<u64>
where
    P: AsRef<Path>,
    C: Codec,
    O: ArchiveObserver,
{
    let bytes = create_archive_with(paths, codec, observer)?;
    write_atomically(output, &bytes)?;
    Ok(bytes.len() as u64)
}
