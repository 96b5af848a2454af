//! Archive entry metadata.
//!
//! An [`ArchiveEntry`] describes one file stored in a `KP04` container: its
//! relative path, the flags byte, both sizes and the extension recorded at
//! creation time. The payload itself stays in the archive buffer.

use kittypress_core::error::{KittyError, Result};
use std::fmt;
use std::path::{Component, Path};

/// Entry flag: the entry carries a payload.
pub const FLAG_HAS_PAYLOAD: u8 = 0x01;

/// One file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Relative path, `/`-separated.
    pub path: String,
    /// Raw flags byte; unknown bits are preserved.
    pub flags: u8,
    /// Size of the original file.
    pub original_size: u64,
    /// Size of the stored payload.
    pub stored_size: u64,
    /// Extension without the leading dot (may be empty).
    pub extension: String,
    /// Offset of the payload from the start of the archive.
    pub payload_offset: u64,
}

impl ArchiveEntry {
    /// Create a new entry with a payload.
    pub fn new(path: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            flags: FLAG_HAS_PAYLOAD,
            original_size: 0,
            stored_size: 0,
            extension: extension.into(),
            payload_offset: 0,
        }
    }

    /// Builder method to set both sizes.
    pub fn with_sizes(mut self, original_size: u64, stored_size: u64) -> Self {
        self.original_size = original_size;
        self.stored_size = stored_size;
        self
    }

    /// Whether the entry carries a payload.
    pub fn has_payload(&self) -> bool {
        self.flags & FLAG_HAS_PAYLOAD != 0
    }

    /// The last path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// The first path segment, if the path has more than one.
    pub fn top_level_dir(&self) -> Option<&str> {
        self.path.split_once('/').map(|(top, _)| top)
    }

    /// Get the compression ratio (stored/original).
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            1.0
        } else {
            self.stored_size as f64 / self.original_size as f64
        }
    }

    /// Get the space savings as a percentage.
    pub fn space_savings(&self) -> f64 {
        if self.original_size == 0 {
            0.0
        } else {
            (1.0 - self.compression_ratio()) * 100.0
        }
    }

    /// Validate the entry path and stored extension for extraction.
    ///
    /// Returns an error if the path is empty or absolute, or if it contains
    /// `..` or a NUL byte, or if the extension is not a single name segment.
    pub fn validate_path(&self) -> Result<()> {
        validate_relative_path(&self.path)?;
        validate_extension(&self.extension).map_err(|_| {
            KittyError::path_traversal(format!("{} (extension {:?})", self.path, self.extension))
        })
    }
}

/// Reject paths that could escape the extraction root.
pub fn validate_relative_path(path: &str) -> Result<()> {
    if path.is_empty() || path.starts_with('/') || path.starts_with('\\') {
        return Err(KittyError::path_traversal(path));
    }

    let p = Path::new(path);
    if p.is_absolute() {
        return Err(KittyError::path_traversal(path));
    }

    for component in p.components() {
        match component {
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(KittyError::path_traversal(path));
            }
            Component::Normal(s) => {
                if s.to_string_lossy().contains('\0') {
                    return Err(KittyError::path_traversal(path));
                }
            }
            Component::CurDir => {}
        }
    }

    // `Path` only splits on the native separator.
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(KittyError::path_traversal(path));
    }

    Ok(())
}

/// Reject stored extensions that are not plain file name suffixes.
pub fn validate_extension(extension: &str) -> Result<()> {
    if extension.contains(['/', '\\', '\0']) || extension.contains("..") {
        return Err(KittyError::path_traversal(extension));
    }
    Ok(())
}

impl fmt::Display for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>10} {:>10} {:>6.1}% {}",
            self.original_size,
            self.stored_size,
            self.space_savings(),
            self.path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_sizes() {
        let entry = ArchiveEntry::new("docs/readme.md", "md").with_sizes(1000, 500);
        assert!(entry.has_payload());
        assert_eq!(entry.compression_ratio(), 0.5);
        assert_eq!(entry.space_savings(), 50.0);
        assert_eq!(entry.file_name(), "readme.md");
        assert_eq!(entry.top_level_dir(), Some("docs"));
    }

    #[test]
    fn test_flat_entry() {
        let entry = ArchiveEntry::new("notes.txt", "txt");
        assert_eq!(entry.file_name(), "notes.txt");
        assert_eq!(entry.top_level_dir(), None);
    }

    #[test]
    fn test_validate_path_safe() {
        assert!(validate_relative_path("subdir/file.txt").is_ok());
        assert!(validate_relative_path("./file.txt").is_ok());
        assert!(validate_relative_path("a..b/file").is_ok());
    }

    #[test]
    fn test_validate_path_traversal() {
        for bad in [
            "../etc/passwd",
            "subdir/../../etc/passwd",
            "/etc/passwd",
            "\\windows\\system32",
            "dir\\..\\..\\evil",
            "",
        ] {
            assert!(
                matches!(
                    validate_relative_path(bad),
                    Err(KittyError::PathTraversal { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_extension() {
        for good in ["", "txt", "gz", "tar.gz", "JPEG"] {
            assert!(validate_extension(good).is_ok(), "{good:?} should be accepted");
        }
        for bad in ["x/../../pwn", "a\\b", "..", "txt\0", "/"] {
            assert!(
                matches!(validate_extension(bad), Err(KittyError::PathTraversal { .. })),
                "{bad:?} should be rejected"
            );
        }

        let entry = ArchiveEntry::new("a.txt", "x/../../pwn");
        assert!(matches!(
            entry.validate_path(),
            Err(KittyError::PathTraversal { .. })
        ));
    }

    #[test]
    fn test_display() {
        let entry = ArchiveEntry::new("a.txt", "txt").with_sizes(200, 50);
        let line = entry.to_string();
        assert!(line.contains("75.0%"));
        assert!(line.ends_with("a.txt"));
    }
}
