//! List command implementation.

use crate::utils::{ListedEntry, print_entries};
use kittypress_archive::{ArchiveFormat, ArchiveReader};
use kittypress_codec::decompress;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// JSON document for an archive listing.
#[derive(Debug, Serialize)]
struct ListingJson<'a> {
    archive: String,
    format: String,
    entries: &'a [ListedEntry],
}

/// Collect the listing rows for a KittyPress file.
fn listed_entries(
    archive: &Path,
    format: ArchiveFormat,
    bytes: &[u8],
) -> Result<Vec<ListedEntry>, Box<dyn std::error::Error>> {
    match format {
        ArchiveFormat::Archive => {
            let reader = ArchiveReader::new(bytes)?;
            reader
                .entries()
                .iter()
                .map(|entry| -> Result<ListedEntry, Box<dyn std::error::Error>> {
                    Ok(ListedEntry::new(
                        entry.path.as_str(),
                        entry.original_size,
                        entry.stored_size,
                        entry.extension.as_str(),
                        reader.method(entry)?,
                    ))
                })
                .collect()
        }
        ArchiveFormat::Payload(version) => {
            // A payload carries no name; show the file's stem with the recorded extension.
            let decoded = decompress(bytes)?;
            let stem = archive
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let method = match (decoded.compressed, version.uses_lz77()) {
                (false, _) => "store",
                (true, false) => "huffman",
                (true, true) => "lz77",
            };
            Ok(vec![ListedEntry::new(
                format!("{stem}{}", decoded.extension),
                decoded.data.len() as u64,
                bytes.len() as u64,
                decoded.extension.trim_start_matches('.'),
                method,
            )])
        }
        ArchiveFormat::Unknown => {
            Err(format!("{} is not a KittyPress file", archive.display()).into())
        }
    }
}

pub fn cmd_list(
    archive: &Path,
    verbose: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(archive)?;
    let (format, _) = ArchiveFormat::detect(&mut bytes.as_slice())?;
    let entries = listed_entries(archive, format, &bytes)?;

    if json {
        let listing = ListingJson {
            archive: archive.display().to_string(),
            format: format.to_string(),
            entries: &entries,
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if verbose {
        println!("Archive: {}", archive.display());
        println!("Format: {}", format);
        println!();
    }
    print_entries(&entries, verbose);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kittypress_archive::create_archive;
    use kittypress_codec::{CodecConfig, compress};
    use tempfile::TempDir;

    #[test]
    fn test_list_archive_entries() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("box");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("big.txt"), "yarn ball ".repeat(100)).unwrap();
        fs::write(src.join("tiny"), b"t").unwrap();
        let bytes = create_archive(&[&src], &CodecConfig::default()).unwrap();

        let path = dir.path().join("box.kitty");
        let entries = listed_entries(&path, ArchiveFormat::Archive, &bytes).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "box/big.txt");
        assert_eq!(entries[0].size, 1000);
        assert_eq!(entries[0].extension, "txt");
        assert_eq!(entries[0].method, "lz77");
        assert_eq!(entries[1].name, "box/tiny");
        assert_eq!(entries[1].method, "store");
    }

    #[test]
    fn test_list_payload() {
        let payload = compress(&b"scratch ".repeat(50), ".log", &CodecConfig::default()).unwrap();
        let format = ArchiveFormat::from_magic(&payload);
        let entries = listed_entries(Path::new("out/session.kp"), format, &payload).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "session.log");
        assert_eq!(entries[0].size, 400);
        assert_eq!(entries[0].extension, "log");
        assert_eq!(entries[0].method, "lz77");
    }
}
