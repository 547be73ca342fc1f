//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - A single sequential directory walk using jwalk
//! - Content fingerprinting with full or partial reads
//! - Lenient size-string parsing for partial-read configuration
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal, size bucketing and per-folder tallies
//! - [`hasher`]: Streaming content digests and partial-read policies
//! - [`size`]: `"4kb"`-style size strings
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{ScannerConfig, TreeScanner};
//! use std::path::Path;
//!
//! let scanner = TreeScanner::new(ScannerConfig::default());
//! let result = scanner.scan(Path::new(".")).unwrap();
//! println!(
//!     "{} files in {} folders, {} distinct sizes",
//!     result.total_files,
//!     result.folders.len(),
//!     result.buckets.len()
//! );
//! ```

pub mod hasher;
pub mod size;
pub mod walker;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// Re-export main types
pub use hasher::{Digest, Fingerprinter, HashAlgorithm, PartialReadPolicy, PartialSizes};
pub use size::parse_size;
pub use walker::{ScanResult, TreeScanner};

/// Number of files directly contained in each visited folder.
pub type FolderStats = BTreeMap<PathBuf, usize>;

/// A file discovered during traversal.
///
/// Immutable once created; the size is the one observed at walk time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileRecord {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileRecord {
    /// Create a new FileRecord.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct ScannerConfig {
    /// Follow symbolic links to directories during traversal.
    /// Cycle handling is whatever jwalk provides.
    pub follow_symlinks: bool,
}

impl ScannerConfig {
    /// Set whether symbolic links are followed.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

/// Errors that abort a directory scan.
///
/// Per-entry problems below the root are logged and skipped instead.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified root path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified root path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing the root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while fingerprinting a single file.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The file is shorter than the head + tail span of its partial-read policy.
    #[error("File too short for head/tail read ({len} < {required} bytes): {path}")]
    TooShort {
        /// Path of the file
        path: PathBuf,
        /// Actual length in bytes
        len: u64,
        /// Bytes the policy needs
        required: u64,
    },

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}
