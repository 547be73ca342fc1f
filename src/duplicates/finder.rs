//! Duplicate detection pipeline.
//!
//! # Overview
//!
//! This module orchestrates the pipeline:
//! 1. **Walk**: one traversal builds size buckets and folder statistics
//!    (see [`crate::scanner::walker`])
//! 2. **Fingerprint**: every file in a bucket of two or more is hashed on a
//!    bounded rayon pool
//! 3. **Group**: a single consumer folds the results into
//!    [`DuplicateSet`]s and sorts them largest first
//!
//! Candidates are dispatched bucket by bucket (largest size first) with each
//! bucket sorted by path, and the pool's ordered `collect` hands results to
//! the grouper in that same order. The "original" of each set is therefore
//! the lexicographically first path among identical files, on every run.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let result = finder.find_duplicates(Path::new(".")).unwrap();
//! for set in &result.sets {
//!     println!("{} bytes: {} copies of {}", set.size, set.duplicate_count(), set.original.path.display());
//! }
//! ```

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::{DuplicateGrouper, DuplicateSet, SizeBuckets};
use crate::progress::ProgressCallback;
use crate::scanner::{
    Digest, FileRecord, Fingerprinter, HashAlgorithm, PartialSizes, ScanError, ScanResult,
    ScannerConfig, TreeScanner,
};

/// Worker count used when available parallelism cannot be determined.
const FALLBACK_IO_THREADS: usize = 4;

/// Default fingerprinting pool size: the host's available parallelism.
#[must_use]
pub fn default_io_threads() -> usize {
    std::thread::available_parallelism().map_or(FALLBACK_IO_THREADS, NonZeroUsize::get)
}

/// Configuration for the fingerprinting phase.
#[derive(Clone)]
pub struct DetectorConfig {
    /// Number of worker threads hashing files concurrently.
    pub io_threads: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("io_threads", &self.io_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            io_threads: default_io_threads(),
            progress_callback: None,
        }
    }
}

impl DetectorConfig {
    /// Set the worker thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Statistics from the fingerprint and grouping phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectStats {
    /// Files in buckets of 2+ that were dispatched for fingerprinting
    pub candidate_files: usize,
    /// Files that produced a digest
    pub hashed_files: usize,
    /// Files that could not be read (no digest)
    pub failed_files: usize,
    /// Distinct digests among hashed files
    pub distinct_digests: usize,
    /// Number of duplicate sets
    pub duplicate_sets: usize,
    /// Number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Bytes that removing every duplicate would free
    pub reclaimable_space: u64,
}

/// Fingerprints size-bucket candidates and groups them by digest.
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    config: DetectorConfig,
    fingerprinter: Arc<Fingerprinter>,
}

impl DuplicateDetector {
    /// Create a detector using `fingerprinter` for every file.
    #[must_use]
    pub fn new(fingerprinter: Fingerprinter, config: DetectorConfig) -> Self {
        Self {
            config,
            fingerprinter: Arc::new(fingerprinter),
        }
    }

    /// Fingerprint every file in buckets holding two or more files.
    ///
    /// Singleton buckets are never read. Results come back in dispatch
    /// order (largest size first, paths ascending within a size), whatever
    /// order the workers finish in.
    #[must_use]
    pub fn fingerprint_candidates(
        &self,
        buckets: &SizeBuckets,
    ) -> Vec<(FileRecord, Option<Digest>)> {
        let candidates = dispatch_order(buckets);
        let total = candidates.len();

        if total == 0 {
            log::debug!("No size bucket holds more than one file; nothing to fingerprint");
            return Vec::new();
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hashing", total);
        }

        log::info!(
            "Fingerprinting {} files with {} ({} threads)",
            total,
            self.fingerprinter.algorithm(),
            self.config.io_threads
        );

        let processed = AtomicUsize::new(0);
        let results = run_in_pool(self.config.io_threads, || {
            candidates
                .into_par_iter()
                .map(|record| {
                    let digest = self.fingerprinter.fingerprint_file(&record.path);
                    let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(done, record.path.to_string_lossy().as_ref());
                    }
                    (record, digest)
                })
                .collect::<Vec<_>>()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hashing");
        }

        results
    }

    /// Find duplicate sets among the size buckets.
    ///
    /// Returns sets sorted by file size, largest first.
    #[must_use]
    pub fn detect(&self, buckets: &SizeBuckets) -> (Vec<DuplicateSet>, DetectStats) {
        let results = self.fingerprint_candidates(buckets);
        let mut stats = DetectStats {
            candidate_files: results.len(),
            ..Default::default()
        };

        let mut grouper = DuplicateGrouper::new();
        for (record, digest) in results {
            grouper.observe(record, digest);
        }
        stats.failed_files = grouper.skipped();
        stats.hashed_files = stats.candidate_files - stats.failed_files;
        stats.distinct_digests = grouper.distinct_digests();

        let sets = grouper.finish();
        stats.duplicate_sets = sets.len();
        stats.duplicate_files = sets.iter().map(DuplicateSet::duplicate_count).sum();
        stats.reclaimable_space = sets.iter().map(DuplicateSet::wasted_space).sum();

        log::info!(
            "Found {} duplicate sets, {} duplicate files, {} reclaimable",
            stats.duplicate_sets,
            stats.duplicate_files,
            ByteSize::b(stats.reclaimable_space)
        );

        (sets, stats)
    }
}

/// Candidates in dispatch order: buckets by size descending, paths ascending.
fn dispatch_order(buckets: &SizeBuckets) -> Vec<FileRecord> {
    let mut candidates: Vec<(u64, &[FileRecord])> = buckets.candidates().collect();
    candidates.sort_by(|a, b| b.0.cmp(&a.0));

    candidates
        .into_iter()
        .flat_map(|(_, files)| {
            let mut files = files.to_vec();
            files.sort_by(|a, b| a.path.cmp(&b.path));
            files
        })
        .collect()
}

/// Run `op` on a dedicated pool of `threads` workers.
fn run_in_pool<R, OP>(threads: usize, op: OP) -> R
where
    R: Send,
    OP: FnOnce() -> R + Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("dupfind-hash-{i}"))
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            log::warn!(
                "Failed to create hashing pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            op()
        }
    }
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the full scan pipeline.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Directory walking options.
    pub scanner: ScannerConfig,
    /// Fingerprinting options.
    pub detector: DetectorConfig,
    /// Hash function used for every digest in the run.
    pub hash_algorithm: HashAlgorithm,
    /// Per-extension partial-read policies.
    pub partial_sizes: PartialSizes,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("scanner", &self.scanner)
            .field("detector", &self.detector)
            .field("hash_algorithm", &self.hash_algorithm)
            .field("partial_sizes", &self.partial_sizes.len())
            .finish()
    }
}

impl FinderConfig {
    /// Set the fingerprinting thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.detector = self.detector.with_io_threads(threads);
        self
    }

    /// Set whether directory symlinks are followed.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.scanner = self.scanner.with_follow_symlinks(follow);
        self
    }

    /// Set the hash algorithm.
    #[must_use]
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Set the per-extension partial-read policies.
    #[must_use]
    pub fn with_partial_sizes(mut self, partial_sizes: PartialSizes) -> Self {
        self.partial_sizes = partial_sizes;
        self
    }

    /// Set the progress callback for both walking and fingerprinting.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.detector = self.detector.with_progress_callback(callback);
        self
    }
}

/// Summary statistics for a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Total number of files seen during the walk
    pub total_files: usize,
    /// Number of folders visited
    pub folders: usize,
    /// Files whose size could not be read during the walk
    pub unreadable_files: usize,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Files ruled out by size alone
    pub eliminated_files: usize,
    /// Files sent to fingerprinting
    pub candidate_files: usize,
    /// Files that produced a digest
    pub hashed_files: usize,
    /// Files that could not be fingerprinted
    pub failed_files: usize,
    /// Number of duplicate sets
    pub duplicate_sets: usize,
    /// Number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Check if any file was skipped because it could not be read.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.unreadable_files > 0 || self.failed_files > 0
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }
}

/// Output of a full pipeline run.
#[derive(Debug, Clone)]
pub struct FindResult {
    /// Traversal output (buckets, folder statistics, totals)
    pub scan: ScanResult,
    /// Duplicate sets, largest files first
    pub sets: Vec<DuplicateSet>,
    /// Summary statistics
    pub summary: ScanSummary,
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The directory walk could not start.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Runs the walk, fingerprint and grouping phases end to end.
#[derive(Debug)]
pub struct DuplicateFinder {
    scanner: TreeScanner,
    detector: DuplicateDetector,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut scanner = TreeScanner::new(config.scanner);
        if let Some(ref callback) = config.detector.progress_callback {
            scanner = scanner.with_progress_callback(Arc::clone(callback));
        }

        let fingerprinter =
            Fingerprinter::new(config.hash_algorithm).with_partial_sizes(config.partial_sizes);

        Self {
            scanner,
            detector: DuplicateDetector::new(fingerprinter, config.detector),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if the root does not exist, is not a
    /// directory, or cannot be read. Unreadable files below the root are
    /// skipped with a warning.
    pub fn find_duplicates(&self, root: &Path) -> Result<FindResult, FinderError> {
        let start_time = Instant::now();

        let scan = self.scanner.scan(root)?;
        let grouping = scan.buckets.grouping_stats();
        log::info!("Total unique file sizes found: {}", grouping.unique_sizes);
        log::info!(
            "Size filter: {} of {} files have a unique size ({:.1}% eliminated), {} candidates in {} buckets",
            grouping.eliminated_unique,
            grouping.total_files,
            grouping.elimination_rate(),
            grouping.candidate_files,
            grouping.candidate_buckets
        );

        let (sets, stats) = self.detector.detect(&scan.buckets);

        let summary = ScanSummary {
            total_files: scan.total_files,
            folders: scan.folders.len(),
            unreadable_files: scan.unreadable_files,
            unique_sizes: grouping.unique_sizes,
            eliminated_files: grouping.eliminated_unique,
            candidate_files: stats.candidate_files,
            hashed_files: stats.hashed_files,
            failed_files: stats.failed_files,
            duplicate_sets: stats.duplicate_sets,
            duplicate_files: stats.duplicate_files,
            reclaimable_space: stats.reclaimable_space,
            scan_duration: start_time.elapsed(),
        };

        Ok(FindResult {
            scan,
            sets,
            summary,
        })
    }
}
