//! Test command implementation.

use kittypress_archive::{ArchiveFormat, ArchiveReader};
use kittypress_codec::{KittyCodec, decompress};
use std::fs;
use std::path::Path;

/// Decode every entry, returning the number decoded and the failures.
fn verify(
    format: ArchiveFormat,
    bytes: &[u8],
    name: &str,
    verbose: bool,
) -> Result<(usize, Vec<(String, String)>), Box<dyn std::error::Error>> {
    let mut errors = Vec::new();
    let mut total_files = 0usize;
    let mut record = |name: &str, result: kittypress_core::Result<()>| {
        total_files += 1;
        match result {
            Ok(()) => {
                if verbose {
                    println!("  OK: {}", name);
                }
            }
            Err(e) => {
                if verbose {
                    println!("  FAILED: {} - {}", name, e);
                }
                errors.push((name.to_string(), e.to_string()));
            }
        }
    };

    match format {
        ArchiveFormat::Archive => {
            let reader = ArchiveReader::new(bytes)?;
            let codec = KittyCodec::default();
            for entry in reader.entries() {
                let result = reader.decode(entry, &codec).and_then(|decoded| {
                    if decoded.data.len() as u64 == entry.original_size {
                        Ok(())
                    } else {
                        Err(kittypress_core::KittyError::corrupted(
                            entry.payload_offset,
                            format!(
                                "decoded {} bytes, expected {}",
                                decoded.data.len(),
                                entry.original_size
                            ),
                        ))
                    }
                });
                record(&entry.path, result);
            }
        }
        ArchiveFormat::Payload(_) => record(name, decompress(bytes).map(|_| ())),
        ArchiveFormat::Unknown => return Err(format!("{} is not a KittyPress file", name).into()),
    }

    Ok((total_files, errors))
}

pub fn cmd_test(archive: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(archive)?;
    let (format, _) = ArchiveFormat::detect(&mut bytes.as_slice())?;

    println!("Testing {} ({})", archive.display(), format);
    let name = archive.display().to_string();
    let (total_files, errors) = verify(format, &bytes, &name, verbose)?;

    println!();
    println!("Test results:");
    println!("  Total files: {}", total_files);
    println!("  OK: {}", total_files - errors.len());
    println!("  Failed: {}", errors.len());

    if !errors.is_empty() {
        if !verbose {
            println!();
            println!("Errors:");
            for (name, err) in &errors {
                println!("  {}: {}", name, err);
            }
        }
        return Err(format!("{} of {} files failed", errors.len(), total_files).into());
    }

    println!();
    println!("All files OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kittypress_archive::create_archive;
    use kittypress_codec::CodecConfig;
    use tempfile::TempDir;

    #[test]
    fn test_verify_good_archive() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "abcabcabc".repeat(20)).unwrap();
        let bytes = create_archive(&[&file], &CodecConfig::default()).unwrap();

        let (total, errors) = verify(ArchiveFormat::Archive, &bytes, "a.kitty", false).unwrap();
        assert_eq!(total, 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_verify_reports_corrupt_entry() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "abcabcabc".repeat(20)).unwrap();
        let mut bytes = create_archive(&[&file], &CodecConfig::default()).unwrap();
        // Break the payload magic of the only entry.
        let reader = ArchiveReader::new(&bytes).unwrap();
        let offset = reader.entries()[0].payload_offset as usize;
        bytes[offset] = b'Z';

        let (total, errors) = verify(ArchiveFormat::Archive, &bytes, "a.kitty", false).unwrap();
        assert_eq!(total, 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "a.txt");
    }
}
