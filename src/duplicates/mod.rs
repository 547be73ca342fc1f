//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping ([`SizeBuckets`])
//! - Content fingerprinting of same-size candidates ([`DuplicateDetector`])
//! - First-seen grouping into [`DuplicateSet`]s ([`DuplicateGrouper`])
//! - The end-to-end pipeline ([`DuplicateFinder`])

pub mod finder;
pub mod groups;

pub use finder::{
    default_io_threads, DetectStats, DetectorConfig, DuplicateDetector, DuplicateFinder,
    FindResult, FinderConfig, FinderError, ScanSummary,
};
pub use groups::{
    sort_by_size_desc, DuplicateGrouper, DuplicateSet, GroupingStats, Observation, SizeBuckets,
};
