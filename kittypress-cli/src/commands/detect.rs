//! Detect command implementation.

use kittypress_archive::ArchiveFormat;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn cmd_detect(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let f = File::open(file)?;
    let mut reader = BufReader::new(f);

    let (format, magic) = ArchiveFormat::detect(&mut reader)?;

    println!("File: {}", file.display());
    println!("Format: {}", format);
    if let Some(generation) = format.generation() {
        println!("Generation: {}", generation);
    }
    println!("Magic bytes: {:02X?}", magic);

    if format.is_archive() {
        println!("Type: Archive (multiple files)");
    } else if format.is_payload() {
        println!("Type: Compressed payload (single file)");
    }

    Ok(())
}
