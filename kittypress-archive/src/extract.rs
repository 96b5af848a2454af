//! `KP04` archive extraction.
//!
//! Everything is written under a single root inside the output directory,
//! named after what the archive holds:
//!
//! | Entries                              | Root                               |
//! |--------------------------------------|------------------------------------|
//! | none                                 | empty directory `KittyPress_Empty` |
//! | one                                  | file `KittyPress_<file name>`      |
//! | several, all under one top directory | directory `KittyPress_<top>`       |
//! | several, otherwise                   | directory `KittyPress_Files`       |
//!
//! The stored extension replaces each file's extension on the way out.

use crate::entry::ArchiveEntry;
use crate::observer::{ArchiveObserver, SilentObserver};
use crate::reader::ArchiveReader;
use kittypress_codec::{KittyCodec, final_output_path, write_atomically};
use kittypress_core::Codec;
use kittypress_core::error::{KittyError, Result};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of every extraction root.
pub const ROOT_PREFIX: &str = "KittyPress_";

/// Root created for an archive without entries.
pub const EMPTY_ROOT: &str = "KittyPress_Empty";

/// Root used when entries share no top-level directory.
pub const FILES_ROOT: &str = "KittyPress_Files";

/// Where an archive's contents land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionRoot {
    /// An empty placeholder directory.
    Empty(String),
    /// A single file, no directory.
    SingleFile(String),
    /// A directory holding every entry at its relative path.
    Directory(String),
}

impl ExtractionRoot {
    /// The root's file or directory name.
    pub fn name(&self) -> &str {
        match self {
            Self::Empty(name) | Self::SingleFile(name) | Self::Directory(name) => name,
        }
    }
}

/// Replace the extension of `name` with `extension` when one was stored.
fn with_stored_extension(name: &str, extension: &str) -> String {
    if extension.is_empty() {
        return name.to_string();
    }
    Path::new(name)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}

/// Decide the extraction root for a set of entries.
pub fn plan_root(entries: &[ArchiveEntry]) -> ExtractionRoot {
    match entries {
        [] => ExtractionRoot::Empty(EMPTY_ROOT.to_string()),
        [only] => {
            let name = with_stored_extension(only.file_name(), &only.extension);
            ExtractionRoot::SingleFile(format!("{ROOT_PREFIX}{name}"))
        }
        [first, rest @ ..] => {
            let shared = first
                .top_level_dir()
                .filter(|top| rest.iter().all(|e| e.top_level_dir() == Some(*top)));
            match shared {
                Some(top) => ExtractionRoot::Directory(format!("{ROOT_PREFIX}{top}")),
                None => ExtractionRoot::Directory(FILES_ROOT.to_string()),
            }
        }
    }
}

/// Check every entry before anything is written.
fn validate_entries(entries: &[ArchiveEntry]) -> Result<()> {
    let mut seen = FxHashSet::default();
    for entry in entries {
        entry.validate_path()?;
        if !seen.insert(entry.path.as_str()) {
            return Err(KittyError::duplicate_entry(&entry.path));
        }
    }
    Ok(())
}

/// Output location of an entry under a directory root.
fn entry_output_path(root: &Path, entry: &ArchiveEntry) -> PathBuf {
    let mut out = root.to_path_buf();
    let segments: Vec<&str> = entry
        .path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    if let Some((last, dirs)) = segments.split_last() {
        for dir in dirs {
            out.push(dir);
        }
        out.push(with_stored_extension(last, &entry.extension));
    }
    out
}

fn write_entry<C: Codec>(
    reader: &ArchiveReader<'_>,
    entry: &ArchiveEntry,
    codec: &C,
    target: &Path,
) -> Result<PathBuf> {
    let decoded = reader.decode(entry, codec)?;
    let target = final_output_path(target, &decoded.extension);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    write_atomically(&target, &decoded.data)?;
    log::debug!("extracted {} -> {}", entry.path, target.display());
    Ok(target)
}

/// Extract an archive under `output_dir` with the default codec.
///
/// Returns the name of the root that was created.
pub fn extract_archive(bytes: &[u8], output_dir: &Path) -> Result<String> {
    extract_archive_with(bytes, output_dir, KittyCodec::default(), SilentObserver)
}

/// Extract an archive under `output_dir`.
///
/// The entry table is parsed and every path validated before anything is
/// written. Returns the name of the root that was created.
pub fn extract_archive_with<C, O>(
    bytes: &[u8],
    output_dir: &Path,
    codec: C,
    mut observer: O,
) -> Result<String>
where
    C: Codec,
    O: ArchiveObserver,
{
    let reader = ArchiveReader::new(bytes)?;
    let entries = reader.entries();
    validate_entries(entries)?;

    let root = plan_root(entries);
    log::debug!("extracting {} entries into {}", entries.len(), root.name());
    observer.begin(entries.len());
    fs::create_dir_all(output_dir)?;

    match &root {
        ExtractionRoot::Empty(name) => {
            fs::create_dir_all(output_dir.join(name))?;
        }
        ExtractionRoot::SingleFile(name) => {
            let entry = &entries[0];
            let path = write_entry(&reader, entry, &codec, &output_dir.join(name))?;
            observer.entry_extracted(entry, &path);
        }
        ExtractionRoot::Directory(name) => {
            let root_dir = output_dir.join(name);
            fs::create_dir_all(&root_dir)?;
            for entry in entries {
                let target = entry_output_path(&root_dir, entry);
                let path = write_entry(&reader, entry, &codec, &target)?;
                observer.entry_extracted(entry, &path);
            }
        }
    }

    observer.finish();
    Ok(root.name().to_string())
}
