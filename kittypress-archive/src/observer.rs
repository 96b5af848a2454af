//! Progress reporting for archive operations.

use crate::entry::ArchiveEntry;
use std::path::Path;

/// Receives per-entry progress while an archive is created or extracted.
///
/// All methods have empty defaults, so an implementation only overrides
/// what it displays.
pub trait ArchiveObserver {
    /// Called once the number of entries is known.
    fn begin(&mut self, _total: usize) {}

    /// Called after an entry has been compressed and appended.
    fn entry_added(&mut self, _entry: &ArchiveEntry) {}

    /// Called after an entry has been written to `path`.
    fn entry_extracted(&mut self, _entry: &ArchiveEntry, _path: &Path) {}

    /// Called when the operation completes successfully.
    fn finish(&mut self) {}
}

/// An observer that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl ArchiveObserver for SilentObserver {}

impl<O: ArchiveObserver + ?Sized> ArchiveObserver for &mut O {
    fn begin(&mut self, total: usize) {
        (**self).begin(total)
    }

    fn entry_added(&mut self, entry: &ArchiveEntry) {
        (**self).entry_added(entry)
    }

    fn entry_extracted(&mut self, entry: &ArchiveEntry, path: &Path) {
        (**self).entry_extracted(entry, path)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}
