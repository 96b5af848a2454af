//! Expansion of input paths into archive inputs.
//!
//! A file becomes one input named by its file name. A directory is walked
//! recursively in sorted order and every regular file below it becomes an
//! input whose relative path starts with the directory's own name.

use kittypress_core::error::{KittyError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A file to be added to an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Where to read the file from.
    pub source: PathBuf,
    /// Path recorded in the archive, `/`-separated.
    pub relative: String,
    /// Extension without the leading dot (may be empty).
    pub extension: String,
}

impl InputFile {
    fn new(source: PathBuf, relative: String) -> Self {
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source,
            relative,
            extension,
        }
    }
}

/// Expand `paths` into the list of files to archive, in input order.
///
/// Fails if a path does not exist.
pub fn collect_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<InputFile>> {
    let mut inputs = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| {
            KittyError::Io(io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        })?;

        let name = file_name_of(path)?;
        if metadata.is_dir() {
            walk_dir(path, &name, &mut inputs)?;
        } else if metadata.is_file() {
            inputs.push(InputFile::new(path.to_path_buf(), name));
        } else {
            log::warn!("skipping {}: not a regular file", path.display());
        }
    }

    Ok(inputs)
}

/// The final component of `path`, resolving `.` and similar through the filesystem.
fn file_name_of(path: &Path) -> Result<String> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }
    let canonical = fs::canonicalize(path)?;
    canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| KittyError::invalid_header(format!("{} has no file name", path.display())))
}

/// Recurse into `dir`. Symlinked files are followed; symlinked directories
/// are not descended into.
fn walk_dir(dir: &Path, prefix: &str, inputs: &mut Vec<InputFile>) -> Result<()> {
    let mut children = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let path = child.path();
        let relative = format!("{prefix}/{}", child.file_name().to_string_lossy());
        let file_type = child.file_type()?;

        if file_type.is_dir() {
            walk_dir(&path, &relative, inputs)?;
        } else if file_type.is_file() {
            inputs.push(InputFile::new(path, relative));
        } else if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(target) if target.is_file() => inputs.push(InputFile::new(path, relative)),
                Ok(_) => log::debug!("not following symlink {}", path.display()),
                Err(e) => log::warn!("skipping {}: {e}", path.display()),
            }
        }
    }

    Ok(())
}
