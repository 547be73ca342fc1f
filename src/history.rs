//! Recently scanned folders.
//!
//! The history is a JSON array of paths, most recent first, with no repeats
//! and at most `max_entries` items. It is advisory: a missing file is an
//! empty history, a corrupt file is logged and treated as empty, and a
//! failed save is only a warning for callers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name used inside the platform data directory.
pub const HISTORY_FILE_NAME: &str = "recent_folders.json";

/// Errors that can occur while reading or writing the history.
#[derive(thiserror::Error, Debug)]
pub enum HistoryError {
    /// The history file exists but could not be read.
    #[error("Failed to read history file {path}: {source}")]
    Read {
        /// History file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The history file is not a JSON array of paths.
    #[error("History file {path} is corrupt: {source}")]
    Parse {
        /// History file path
        path: PathBuf,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The history file could not be written.
    #[error("Failed to write history file {path}: {source}")]
    Write {
        /// History file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The history could not be encoded.
    #[error("Failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistent most-recent-first folder list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentFolders {
    path: PathBuf,
    max_entries: usize,
    folders: Vec<PathBuf>,
}

impl RecentFolders {
    /// Create an empty history stored at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            max_entries,
            folders: Vec::new(),
        }
    }

    /// Load the history, treating any failure as an empty list.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        let path = path.into();
        match Self::try_load(&path, max_entries) {
            Ok(history) => history,
            Err(e) => {
                log::warn!("{}; starting with an empty history", e);
                Self::new(path, max_entries)
            }
        }
    }

    /// Load the history, reporting read and parse failures.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Read`] or [`HistoryError::Parse`].
    pub fn try_load(path: &Path, max_entries: usize) -> Result<Self, HistoryError> {
        let mut history = Self::new(path, max_entries);

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(history),
            Err(source) => {
                return Err(HistoryError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        history.folders =
            serde_json::from_str(&content).map_err(|source| HistoryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        history.folders.truncate(max_entries);
        Ok(history)
    }

    /// Where this history is stored.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Folders, most recent first.
    #[must_use]
    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    /// Number of remembered folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Check if no folder has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Move `folder` to the front, dropping older entries past the cap.
    pub fn record(&mut self, folder: &Path) {
        self.folders.retain(|f| f != folder);
        self.folders.insert(0, folder.to_path_buf());
        self.folders.truncate(self.max_entries);
    }

    /// Resolve a 1-based menu choice typed by the user.
    ///
    /// Returns `None` for anything that is not a listed number.
    #[must_use]
    pub fn choose(&self, input: &str) -> Option<&Path> {
        let choice: usize = input.trim().parse().ok()?;
        let index = choice.checked_sub(1)?;
        self.folders.get(index).map(PathBuf::as_path)
    }

    /// Write the history, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Write`] if the file cannot be written.
    pub fn save(&self) -> Result<(), HistoryError> {
        let content = serde_json::to_string(&self.folders)?;
        let write_err = |source| HistoryError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&self.path, content).map_err(write_err)?;
        Ok(())
    }
}
