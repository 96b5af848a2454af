//! Create command implementation.

use crate::utils::{ProgressObserver, savings_percent};
use clap::ValueEnum;
use kittypress_archive::write_archive;
use kittypress_codec::{CodecConfig, KittyCodec};
use std::path::{Path, PathBuf};

/// Compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum CompressionLevel {
    /// Store without compression
    Store,
    /// Fast compression
    Fast,
    /// Normal compression (default)
    #[default]
    Normal,
    /// Best compression
    Best,
}

impl From<CompressionLevel> for kittypress_core::CompressionLevel {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Store => Self::NONE,
            CompressionLevel::Fast => Self::FAST,
            CompressionLevel::Normal => Self::DEFAULT,
            CompressionLevel::Best => Self::BEST,
        }
    }
}

/// Codec settings for a level and optional window override.
fn codec_config(level: CompressionLevel, window: Option<usize>) -> CodecConfig {
    let config = CodecConfig::from_level(level.into());
    match window {
        Some(window) => config.with_window_size(window),
        None => config,
    }
}

pub fn cmd_create(
    archive: &Path,
    paths: &[PathBuf],
    level: CompressionLevel,
    window: Option<usize>,
    verbose: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if paths.is_empty() {
        return Err("No files specified".into());
    }

    let config = codec_config(level, window);
    println!("Creating archive: {}", archive.display());

    let mut observer = ProgressObserver::new(progress && !verbose, verbose);
    let archive_size = write_archive(archive, paths, KittyCodec::new(config), &mut observer)?;

    println!(
        "Added {} file(s): {} → {} bytes ({:.1}% saved)",
        observer.files(),
        observer.original(),
        observer.stored(),
        savings_percent(observer.original(), observer.stored())
    );
    println!("Archive size: {} bytes", archive_size);
    Ok(())
}
