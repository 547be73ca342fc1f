//! Output formatters for duplicate scan results.
//!
//! This module provides the Markdown report written at the end of a scan.
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
//!
//! // Print the report to stdout
//! let report = MarkdownReport::new(&result.sets, &result.scan.folders, result.scan.total_files);
//! print!("{}", report.render());
//! ```

pub mod markdown;

// Re-export main types
pub use markdown::{MarkdownReport, ReportError};
