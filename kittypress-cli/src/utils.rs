//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use kittypress_archive::{ArchiveEntry, ArchiveObserver};
use serde::Serialize;
use std::path::Path;

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}

/// Percentage of space saved, or 0 for empty input.
pub fn savings_percent(original: u64, stored: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        (1.0 - stored as f64 / original as f64) * 100.0
    }
}

/// Drives a progress bar from archive events and tallies sizes.
pub struct ProgressObserver {
    bar: ProgressBar,
    verbose: bool,
    files: usize,
    original: u64,
    stored: u64,
}

impl ProgressObserver {
    pub fn new(progress: bool, verbose: bool) -> Self {
        Self {
            bar: create_progress_bar(0, progress),
            verbose,
            files: 0,
            original: 0,
            stored: 0,
        }
    }

    pub fn files(&self) -> usize {
        self.files
    }

    pub fn original(&self) -> u64 {
        self.original
    }

    pub fn stored(&self) -> u64 {
        self.stored
    }

    fn line(&self, message: String) {
        if !self.verbose {
            return;
        }
        if self.bar.is_hidden() {
            println!("{}", message);
        } else {
            self.bar.println(message);
        }
    }

    fn tally(&mut self, entry: &ArchiveEntry) {
        self.files += 1;
        self.original += entry.original_size;
        self.stored += entry.stored_size;
        self.bar.set_message(entry.path.clone());
        self.bar.inc(1);
    }
}

impl ArchiveObserver for ProgressObserver {
    fn begin(&mut self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn entry_added(&mut self, entry: &ArchiveEntry) {
        self.line(format!(
            "  + {} ({} → {} bytes)",
            entry.path, entry.original_size, entry.stored_size
        ));
        self.tally(entry);
    }

    fn entry_extracted(&mut self, entry: &ArchiveEntry, path: &Path) {
        self.line(format!("  - {} → {}", entry.path, path.display()));
        self.tally(entry);
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// One row of an archive listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListedEntry {
    pub name: String,
    pub size: u64,
    pub compressed_size: u64,
    pub ratio: f64,
    pub extension: String,
    pub method: String,
}

impl ListedEntry {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        compressed_size: u64,
        extension: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            compressed_size,
            ratio: savings_percent(size, compressed_size),
            extension: extension.into(),
            method: method.into(),
        }
    }
}

/// Print entries in a formatted table.
pub fn print_entries(entries: &[ListedEntry], verbose: bool) {
    if verbose {
        println!(
            "{:>10} {:>10} {:>7} {:>8}  Name",
            "Size", "Compressed", "Ratio", "Method",
        );
        println!("{}", "-".repeat(60));

        let mut total_size = 0u64;
        let mut total_compressed = 0u64;

        for entry in entries {
            let ratio = if entry.size > 0 {
                format!("{:.1}%", entry.ratio)
            } else {
                "-".to_string()
            };

            println!(
                "{:>10} {:>10} {:>7} {:>8}  {}",
                entry.size, entry.compressed_size, ratio, entry.method, entry.name
            );

            total_size += entry.size;
            total_compressed += entry.compressed_size;
        }

        println!("{}", "-".repeat(60));
        println!(
            "{:>10} {:>10} {:>6.1}%           {} files",
            total_size,
            total_compressed,
            savings_percent(total_size, total_compressed),
            entries.len()
        );
    } else {
        for entry in entries {
            println!("{}", entry.name);
        }
    }
}
