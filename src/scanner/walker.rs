//! Single-pass directory traversal using jwalk.
//!
//! # Overview
//!
//! [`TreeScanner`] walks a directory tree exactly once and produces
//! everything the later phases need:
//!
//! - [`SizeBuckets`]: every readable file, keyed by exact size
//! - [`FolderStats`]: how many files each visited folder directly contains
//! - the total number of files seen
//!
//! Children are sorted by file name, so traversal order (and therefore
//! bucket order) is stable across runs. Files whose size cannot be read are
//! logged and left out of the buckets, but still count toward their folder
//! and the total.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{ScannerConfig, TreeScanner};
//! use std::path::Path;
//!
//! let scanner = TreeScanner::new(ScannerConfig::default());
//! let result = scanner.scan(Path::new("/home/user/Downloads")).unwrap();
//! for (folder, count) in &result.folders {
//!     println!("{}: {} files", folder.display(), count);
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileRecord, FolderStats, ScanError, ScannerConfig};
use crate::duplicates::SizeBuckets;
use crate::progress::ProgressCallback;

/// How often (in files) the walking phase reports progress.
const PROGRESS_INTERVAL: usize = 256;

/// Everything gathered by one traversal.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Readable files keyed by exact size
    pub buckets: SizeBuckets,
    /// Direct file count per visited folder (root included)
    pub folders: FolderStats,
    /// Every file seen, readable or not
    pub total_files: usize,
    /// Files whose size could not be read
    pub unreadable_files: usize,
}

/// Walks a directory tree once, bucketing files by size.
pub struct TreeScanner {
    config: ScannerConfig,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for TreeScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeScanner")
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl TreeScanner {
    /// Create a scanner with the given configuration.
    #[must_use]
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Walk `root` and collect size buckets and folder statistics.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] only when the root itself is missing, not a
    /// directory, or unreadable. Problems below the root are logged and
    /// skipped.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        validate_root(root)?;

        let mut result = ScanResult::default();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let walk_dir = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(false)
            .sort(true);

        for entry in walk_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Could not read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();

            if entry.file_type().is_dir() {
                log::debug!("Scanning folder: {}", path.display());
                result.folders.entry(path).or_insert(0);
                continue;
            }

            // Sizes follow symlinks; a link to a directory is not a file.
            let metadata = fs::metadata(&path);
            if metadata.as_ref().is_ok_and(fs::Metadata::is_dir) {
                log::trace!("Skipping directory symlink: {}", path.display());
                continue;
            }

            let parent = path
                .parent()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            *result.folders.entry(parent).or_insert(0) += 1;
            result.total_files += 1;

            match metadata {
                Ok(metadata) if metadata.is_file() => {
                    result.buckets.insert(FileRecord::new(path, metadata.len()));
                }
                // FIFOs, sockets and devices are counted but never opened.
                Ok(_) => {
                    log::debug!("Skipping non-regular file: {}", path.display());
                }
                Err(e) => {
                    log::warn!("Could not access file {}: {}", path.display(), e);
                    result.unreadable_files += 1;
                }
            }

            if result.total_files % PROGRESS_INTERVAL == 0 {
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(result.total_files, &entry.file_name().to_string_lossy());
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("walking");
        }

        log::info!(
            "Scanned {} files in {} folders ({} distinct sizes)",
            result.total_files,
            result.folders.len(),
            result.buckets.len()
        );

        Ok(result)
    }
}

fn validate_root(root: &Path) -> Result<(), ScanError> {
    match fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ScanError::NotFound(root.to_path_buf()))
        }
        Err(e) => Err(ScanError::Io {
            path: root.to_path_buf(),
            source: e,
        }),
    }
}

/// Sum of the sizes of the regular files directly inside `folder`.
///
/// This is a fresh filesystem pass, not a lookup into scan results.
///
/// # Errors
///
/// Returns an error if the folder cannot be listed. Entries that vanish or
/// cannot be stat-ed are skipped.
pub fn direct_file_bytes(folder: &Path) -> io::Result<u64> {
    let mut total = 0u64;
    for entry in fs::read_dir(folder)? {
        let Ok(entry) = entry else { continue };
        let path: PathBuf = entry.path();
        if let Ok(metadata) = fs::metadata(&path) {
            if metadata.is_file() {
                total += metadata.len();
            }
        }
    }
    Ok(total)
}
