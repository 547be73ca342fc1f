//! Markdown report generation.
//!
//! The report has three parts:
//! 1. a header with the total number of files processed
//! 2. one `###` line per visited folder with its direct byte size and file count
//! 3. one section per duplicate set, largest files first, listing each
//!    duplicate (never the original) as a heading plus a link
//!
//! Each duplicate's heading level follows the depth of its path, so deeper
//! files get smaller headings.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::DuplicateFinder;
//! use dupfind::output::MarkdownReport;
//! use std::path::Path;
//!
//! let result = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//! let report = MarkdownReport::new(&result.sets, &result.scan.folders, result.scan.total_files);
//! report.write_to(Path::new("duplicate_files_report.md")).unwrap();
//! ```

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::duplicates::DuplicateSet;
use crate::scanner::walker::direct_file_bytes;
use crate::scanner::FolderStats;

/// Deepest Markdown heading level.
const MAX_HEADING_LEVEL: usize = 6;

/// Errors that can occur while producing the report.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// The report file could not be written.
    #[error("Failed to write report to {path}: {source}")]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Formatter for the Markdown duplicate report.
#[derive(Debug)]
pub struct MarkdownReport<'a> {
    sets: &'a [DuplicateSet],
    folders: &'a FolderStats,
    total_files: usize,
}

impl<'a> MarkdownReport<'a> {
    /// Create a formatter over scan results.
    ///
    /// `sets` are rendered in the order given; pass them already sorted.
    #[must_use]
    pub fn new(sets: &'a [DuplicateSet], folders: &'a FolderStats, total_files: usize) -> Self {
        Self {
            sets,
            folders,
            total_files,
        }
    }

    /// Render the complete report.
    ///
    /// Folder byte sizes are read from disk now, not taken from the scan.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# Duplicate Files Report");
        let _ = writeln!(out, "Total files processed: {}", self.total_files);
        let _ = writeln!(out);

        let _ = writeln!(out, "## Folder Sizes and File Counts");
        for (folder, count) in self.folders {
            let bytes = folder_bytes(folder);
            let _ = writeln!(
                out,
                "### {} (Size: {} bytes, Files: {})",
                folder.display(),
                bytes,
                count
            );
        }

        for (i, set) in self.sets.iter().enumerate() {
            let _ = writeln!(out, "# Duplicate Set {} (Size: {} bytes)", i + 1, set.size);
            for file in &set.duplicates {
                let path = file.path.display();
                let _ = writeln!(out, "{} {}", "#".repeat(heading_level(&file.path)), path);
                let _ = writeln!(out, "[Link to file]({path})");
                let _ = writeln!(out);
            }
        }

        out
    }

    /// Write the rendered report to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.render().as_bytes())?;
        writer.flush()
    }

    /// Write the report to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Write`] if the file cannot be created or written.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.render()).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Duplicate files report generated: {}", path.display());
        Ok(())
    }
}

/// Markdown heading level for a path: component count minus one, in 1..=6.
#[must_use]
pub fn heading_level(path: &Path) -> usize {
    path.components()
        .count()
        .saturating_sub(1)
        .clamp(1, MAX_HEADING_LEVEL)
}

fn folder_bytes(folder: &Path) -> u64 {
    match direct_file_bytes(folder) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Could not measure folder {}: {}", folder.display(), e);
            0
        }
    }
}
