//! Extract command implementation.

use crate::utils::ProgressObserver;
use kittypress_archive::{ArchiveFormat, extract_archive_with};
use kittypress_codec::{KittyCodec, decompress_file};
use std::fs;
use std::path::{Path, PathBuf};

/// Output path for a payload decoded without `-o`: the input minus its
/// extension, or `<input>.out` when it has none.
fn default_payload_output(input: &Path) -> PathBuf {
    let stem = input.with_extension("");
    if stem == input {
        let mut name = input.as_os_str().to_os_string();
        name.push(".out");
        PathBuf::from(name)
    } else {
        stem
    }
}

pub fn cmd_extract(
    archive: &Path,
    output: Option<&Path>,
    verbose: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(archive)?;
    let (format, magic) = ArchiveFormat::detect(&mut bytes.as_slice())?;

    match format {
        ArchiveFormat::Archive => {
            let out_dir = output.unwrap_or(Path::new("."));
            let mut observer = ProgressObserver::new(progress && !verbose, verbose);
            let root = extract_archive_with(&bytes, out_dir, KittyCodec::default(), &mut observer)?;
            println!(
                "Extracted {} file(s) to {}",
                observer.files(),
                out_dir.join(&root).display()
            );
        }
        ArchiveFormat::Payload(version) => {
            let output = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| default_payload_output(archive));
            let written = decompress_file(archive, &output)?;
            println!("Decompressed {} payload to {}", version, written.display());
        }
        ArchiveFormat::Unknown => {
            return Err(format!(
                "{} is not a KittyPress file (magic bytes {:02X?})",
                archive.display(),
                magic
            )
            .into());
        }
    }

    Ok(())
}
