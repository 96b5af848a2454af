//! # KittyPress Archive
//!
//! The `KP04` multi-file container.
//!
//! An archive is a small header followed by one record per file: the
//! relative path, a flags byte, original and stored sizes, the extension,
//! and a single-file payload produced by a [`Codec`](kittypress_core::Codec).
//!
//! - [`writer`]: build archives from files and directories
//! - [`reader`]: parse the entry table and decode payloads
//! - [`extract`]: write an archive's contents under a named root
//! - [`detect`]: tell archives, payloads and foreign files apart
//!
//! ## Example
//!
//! ```rust,no_run
//! use kittypress_archive::{create_archive, extract_archive};
//! use kittypress_codec::CodecConfig;
//! use std::path::Path;
//!
//! let bytes = create_archive(&["notes", "todo.txt"], &CodecConfig::default()).unwrap();
//! let root = extract_archive(&bytes, Path::new("out")).unwrap();
//! println!("extracted into out/{root}");
//! ```
//!
//! ## Progress
//!
//! Creation and extraction report each entry to an [`ArchiveObserver`];
//! [`SilentObserver`] ignores everything.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod detect;
pub mod entry;
pub mod extract;
pub mod header;
pub mod observer;
pub mod reader;
pub mod walk;
pub mod writer;

// Re-exports
pub use detect::ArchiveFormat;
pub use entry::ArchiveEntry;
pub use extract::{ExtractionRoot, extract_archive, extract_archive_with, plan_root};
pub use header::ArchiveHeader;
pub use observer::{ArchiveObserver, SilentObserver};
pub use reader::ArchiveReader;
pub use walk::{InputFile, collect_inputs};
pub use writer::{ArchiveWriter, create_archive, create_archive_with, write_archive};
